use validator::Validate;

use folio_core::domain::{Category, CategoryDraft, SortOrderUpdate};
use folio_shared::dto::{CategoryListQuery, validate_each};

use super::{QueryCache, cached};
use crate::http::{ApiClient, Body, HttpClientError, Query, data, validated, validated_list};

const PREFIX: &str = "categories:";

/// Client for `/api/categories`.
#[derive(Clone)]
pub struct CategoriesClient {
    api: ApiClient,
    cache: Option<QueryCache>,
}

impl CategoriesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api, cache: None }
    }

    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// List categories in display order.
    pub async fn list(&self, only_visible: bool) -> Result<Vec<Category>, HttpClientError> {
        let key = format!("{PREFIX}list:{only_visible}");
        let params = CategoryListQuery {
            only_visible: Some(only_visible),
        };
        cached(self.cache.as_ref(), &key, async {
            self.api
                .get("/api/categories")
                .query(Query::from_serialize(&params)?)
                .send_as(&data(validated_list::<Category>()))
                .await
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Category, HttpClientError> {
        let key = format!("{PREFIX}id:{id}");
        cached(self.cache.as_ref(), &key, async {
            self.api
                .get(&format!("/api/categories/{id}"))
                .send_as(&data(validated::<Category>()))
                .await
        })
        .await
    }

    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, HttpClientError> {
        draft.validate()?;
        let created = self
            .api
            .post("/api/categories", Body::json(draft)?)
            .send_as(&data(validated::<Category>()))
            .await?;
        self.invalidate().await;
        Ok(created)
    }

    /// Overwrite every field of category `id`.
    pub async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category, HttpClientError> {
        draft.validate()?;
        let updated = self
            .api
            .put(&format!("/api/categories/{id}"), Body::json(draft)?)
            .send_as(&data(validated::<Category>()))
            .await?;
        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), HttpClientError> {
        self.api
            .delete(&format!("/api/categories/{id}"))
            .send()
            .await?;
        self.invalidate().await;
        if let Some(cache) = &self.cache {
            cache.invalidate(super::posts::PREFIX).await;
        }
        Ok(())
    }

    /// Bulk reassign sort orders; returns the reordered list.
    pub async fn reorder(
        &self,
        updates: &[SortOrderUpdate],
    ) -> Result<Vec<Category>, HttpClientError> {
        validate_each(updates)?;
        let categories = self
            .api
            .put("/api/categories/order", Body::json(updates)?)
            .send_as(&data(validated_list::<Category>()))
            .await?;
        self.invalidate().await;
        Ok(categories)
    }

    async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(PREFIX).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ClientConfig;
    use url::Url;

    fn client() -> CategoriesClient {
        // Port 9 discards; validation must fail before anything is sent.
        let config = ClientConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
        CategoriesClient::new(ApiClient::native(config))
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let draft = CategoryDraft {
            name: String::new(),
            slug: "x".to_string(),
            description: None,
            sort_order: None,
            is_visible: true,
        };
        let err = client().create(&draft).await.unwrap_err();
        match err {
            HttpClientError::InvalidRequest(errors) => {
                assert!(errors.field_errors().contains_key("name"));
            }
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reorder_rejects_negative_order() {
        let updates = [SortOrderUpdate {
            id: 1,
            sort_order: -1,
        }];
        let err = client().reorder(&updates).await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidRequest(_)));
    }
}
