//! Typed resource clients for the blog REST API.

mod categories;
mod posts;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use folio_core::ports::Cache;

use crate::http::HttpClientError;

pub use categories::CategoriesClient;
pub use posts::PostsClient;

/// How long a cached read stays fresh.
pub const QUERY_TTL: Duration = Duration::from_secs(30);

/// Short-lived cache of decoded reads, invalidated by key prefix after
/// every mutation. Cache failures never fail the call.
#[derive(Clone)]
pub struct QueryCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self::with_ttl(cache, QUERY_TTL)
    }

    pub fn with_ttl(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key, "Query cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Query result not cacheable");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &raw, Some(self.ttl)).await {
            tracing::warn!(key, error = %e, "Query cache write failed");
        }
    }

    pub async fn invalidate(&self, prefix: &str) {
        if let Err(e) = self.cache.invalidate_prefix(prefix).await {
            tracing::warn!(prefix, error = %e, "Query cache invalidation failed");
        }
    }
}

/// Read through an optional cache.
async fn cached<T, F>(
    cache: Option<&QueryCache>,
    key: &str,
    fetch: F,
) -> Result<T, HttpClientError>
where
    T: Serialize + DeserializeOwned,
    F: std::future::Future<Output = Result<T, HttpClientError>>,
{
    if let Some(cache) = cache {
        if let Some(hit) = cache.get(key).await {
            return Ok(hit);
        }
    }
    let value = fetch.await?;
    if let Some(cache) = cache {
        cache.put(key, &value).await;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;

    #[tokio::test]
    async fn test_cached_reads_once() {
        let cache = QueryCache::new(Arc::new(InMemoryCache::new()));
        let first: Vec<i32> = cached(Some(&cache), "k", async { Ok(vec![1, 2]) })
            .await
            .unwrap();
        let second: Vec<i32> = cached(Some(&cache), "k", async {
            Err(HttpClientError::Configuration("not served from cache".into()))
        })
        .await
        .unwrap();
        assert_eq!(first, second);

        cache.invalidate("k").await;
        assert!(cache.get::<Vec<i32>>("k").await.is_none());
    }
}
