use validator::{Validate, ValidationErrors};

use folio_core::domain::rules::validate_slug;
use folio_core::domain::{Post, PostDraft};
use folio_shared::dto::{Page, PostListQuery};

use super::{QueryCache, cached};
use crate::http::{ApiClient, Body, HttpClientError, Query, data, validated};

pub(super) const PREFIX: &str = "posts:";

/// Client for `/api/posts`.
#[derive(Clone)]
pub struct PostsClient {
    api: ApiClient,
    cache: Option<QueryCache>,
}

impl PostsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api, cache: None }
    }

    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// One page of posts, newest first.
    pub async fn list(&self, query: &PostListQuery) -> Result<Page<Post>, HttpClientError> {
        query.validate()?;
        let params = Query::from_serialize(query)?;
        let key = format!(
            "{PREFIX}list:{}",
            serde_json::to_string(query).map_err(|e| HttpClientError::Encode(e.to_string()))?
        );
        cached(self.cache.as_ref(), &key, async {
            self.api
                .get("/api/posts")
                .query(params)
                .send_as(&data(validated::<Page<Post>>()))
                .await
        })
        .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, HttpClientError> {
        if let Err(e) = validate_slug(slug) {
            let mut errors = ValidationErrors::new();
            errors.add("slug", e);
            return Err(errors.into());
        }
        let key = format!("{PREFIX}slug:{slug}");
        cached(self.cache.as_ref(), &key, async {
            self.api
                .get(&format!("/api/posts/{slug}"))
                .send_as(&data(validated::<Post>()))
                .await
        })
        .await
    }

    pub async fn create(&self, draft: &PostDraft) -> Result<Post, HttpClientError> {
        draft.validate()?;
        let created = self
            .api
            .post("/api/posts", Body::json(draft)?)
            .send_as(&data(validated::<Post>()))
            .await?;
        self.invalidate().await;
        Ok(created)
    }

    /// Full overwrite of post `id`.
    pub async fn update(&self, id: i64, draft: &PostDraft) -> Result<Post, HttpClientError> {
        draft.validate()?;
        let updated = self
            .api
            .put(&format!("/api/posts/{id}"), Body::json(draft)?)
            .send_as(&data(validated::<Post>()))
            .await?;
        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), HttpClientError> {
        self.api.delete(&format!("/api/posts/{id}")).send().await?;
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(PREFIX).await;
        }
    }
}
