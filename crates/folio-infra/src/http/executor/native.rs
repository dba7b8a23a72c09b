//! Server-side executor: reqwest with cache hints forwarded as headers.

use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use http::header::{CACHE_CONTROL, HeaderName, HeaderValue};

use folio_core::ports::{
    CacheHints, ExecutorError, HttpExecutor, HttpRequest, HttpResponse, RequestContext,
};

use super::convert::{build_request, into_response, map_reqwest_error};

/// Header carrying cache tags for upstream invalidation.
pub const CACHE_TAGS_HEADER: HeaderName = HeaderName::from_static("x-cache-tags");

/// Executor for server-side callers. Honors [`CacheHints`]; never retries.
#[derive(Debug, Clone)]
pub struct NativeExecutor {
    client: reqwest::Client,
}

impl NativeExecutor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured reqwest client (proxy, TLS roots, pool limits).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for NativeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Write cache hints into `headers`. A caller-supplied `cache-control` wins.
pub fn apply_cache_hints(hints: &CacheHints, headers: &mut HeaderMap) {
    if !headers.contains_key(CACHE_CONTROL) {
        let directive = if hints.no_store {
            Some("no-store".to_string())
        } else {
            hints.revalidate.map(max_age)
        };
        if let Some(value) = directive.and_then(|d| HeaderValue::from_str(&d).ok()) {
            headers.insert(CACHE_CONTROL, value);
        }
    }

    if !hints.tags.is_empty() {
        match HeaderValue::from_str(&hints.tags.join(",")) {
            Ok(value) => {
                headers.insert(CACHE_TAGS_HEADER, value);
            }
            Err(_) => tracing::warn!(tags = ?hints.tags, "Dropping cache tags with invalid characters"),
        }
    }
}

fn max_age(after: Duration) -> String {
    format!("max-age={}", after.as_secs())
}

#[async_trait]
impl HttpExecutor for NativeExecutor {
    async fn execute(
        &self,
        mut request: HttpRequest,
        ctx: &RequestContext,
    ) -> Result<HttpResponse, ExecutorError> {
        apply_cache_hints(&request.cache, &mut request.headers);

        tracing::debug!(
            request_id = %ctx.id,
            method = %ctx.method,
            url = %ctx.log_url(),
            "Dispatching request"
        );

        let response = build_request(&self.client, request)?
            .send()
            .await
            .map_err(map_reqwest_error)?;

        tracing::debug!(
            request_id = %ctx.id,
            status = response.status().as_u16(),
            elapsed_ms = ctx.elapsed_ms() as u64,
            "Response headers received"
        );

        Ok(into_response(response))
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_store_wins_over_revalidate() {
        let hints = CacheHints {
            revalidate: Some(Duration::from_secs(60)),
            no_store: true,
            tags: vec![],
        };
        let mut headers = HeaderMap::new();
        apply_cache_hints(&hints, &mut headers);
        assert_eq!(headers[CACHE_CONTROL], "no-store");
        assert!(!headers.contains_key(CACHE_TAGS_HEADER));
    }

    #[test]
    fn test_revalidate_and_tags() {
        let hints = CacheHints::revalidate(Duration::from_secs(30))
            .with_tag("posts")
            .with_tag("categories");
        let mut headers = HeaderMap::new();
        apply_cache_hints(&hints, &mut headers);
        assert_eq!(headers[CACHE_CONTROL], "max-age=30");
        assert_eq!(headers[CACHE_TAGS_HEADER], "posts,categories");
    }

    #[test]
    fn test_caller_cache_control_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("private"));
        apply_cache_hints(&CacheHints::no_store(), &mut headers);
        assert_eq!(headers[CACHE_CONTROL], "private");
    }

    #[test]
    fn test_empty_hints_add_nothing() {
        let mut headers = HeaderMap::new();
        apply_cache_hints(&CacheHints::default(), &mut headers);
        assert!(headers.is_empty());
    }
}
