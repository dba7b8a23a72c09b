//! HTTP executor port - the pluggable network call behind the API client.
//!
//! The client builds an [`HttpRequest`] and hands it to an [`HttpExecutor`];
//! everything before and after the round trip (encoding, decoding,
//! validation) is executor-agnostic. Executors never treat an HTTP error
//! status as a failure and never retry.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use url::Url;
use uuid::Uuid;

/// Boxed transport cause carried by [`ExecutorError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One named part of a multipart form body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

/// Multipart form body. Its content type (with boundary) is chosen by the
/// executor's runtime, never by the encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }
}

/// Request body after encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EncodedBody {
    #[default]
    Empty,
    Bytes(Bytes),
    Multipart(FormData),
}

/// Caching and revalidation hints passed through to the server executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheHints {
    /// Serve from cache for at most this long before revalidating.
    pub revalidate: Option<Duration>,
    /// Bypass every cache.
    pub no_store: bool,
    /// Tags used for targeted invalidation upstream.
    pub tags: Vec<String>,
}

impl CacheHints {
    pub fn no_store() -> Self {
        Self {
            no_store: true,
            ..Self::default()
        }
    }

    pub fn revalidate(after: Duration) -> Self {
        Self {
            revalidate: Some(after),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.revalidate.is_none() && !self.no_store && self.tags.is_empty()
    }
}

/// A fully built request ready for the network.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: EncodedBody,
    pub cache: CacheHints,
    pub timeout: Option<Duration>,
}

/// Per-call context threaded through the executor for log correlation.
///
/// Each call owns its context, so timing needs no shared state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub id: Uuid,
    pub method: Method,
    pub url: Url,
    started: Instant,
}

impl RequestContext {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            url,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }

    /// The URL without query or fragment. Query strings may carry
    /// credentials, so only this form goes to logs and error messages.
    pub fn log_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.to_string()
    }
}

/// Lazily read response body; consumed at most once.
#[async_trait]
pub trait ResponseBody: Send {
    async fn bytes(self: Box<Self>) -> Result<Bytes, ExecutorError>;
}

#[async_trait]
impl ResponseBody for Bytes {
    async fn bytes(self: Box<Self>) -> Result<Bytes, ExecutorError> {
        Ok(*self)
    }
}

/// Response as returned by an executor, body not yet read.
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: Box<dyn ResponseBody>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl ResponseBody + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    /// Response whose body is already in memory.
    pub fn buffered(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self::new(status, headers, body.into())
    }

    /// The `content-type` header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Consume the response and read the whole body.
    pub async fn bytes(self) -> Result<Bytes, ExecutorError> {
        self.body.bytes().await
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Transport-level failures. HTTP error statuses are not errors here.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    #[error("request cancelled")]
    Cancelled,

    #[error("reading response body failed: {0}")]
    Body(#[source] BoxError),

    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),
}

/// Executor trait - performs the actual network call for a built request.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Send the request; any HTTP status is a successful execution.
    async fn execute(
        &self,
        request: HttpRequest,
        ctx: &RequestContext,
    ) -> Result<HttpResponse, ExecutorError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffered_body_reads_once() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        let response = HttpResponse::buffered(StatusCode::OK, headers, "hello");

        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(response.bytes().await.unwrap(), Bytes::from("hello"));
    }

    #[test]
    fn test_cache_hints() {
        assert!(CacheHints::default().is_empty());
        let hints = CacheHints::revalidate(Duration::from_secs(60)).with_tag("posts");
        assert!(!hints.is_empty());
        assert_eq!(hints.tags, vec!["posts".to_string()]);
        assert!(CacheHints::no_store().no_store);
    }

    #[test]
    fn test_form_data_keeps_order() {
        let form = FormData::new()
            .text("title", "Hello")
            .file("thumb", "a.png", Some("image/png".to_string()), vec![1u8, 2, 3]);
        assert_eq!(form.parts().len(), 2);
        assert!(matches!(&form.parts()[0], FormPart::Text { name, .. } if name == "title"));
    }

    #[test]
    fn test_log_url_drops_query() {
        let url = Url::parse("https://oauth2.example/tokeninfo?id_token=secret#frag").unwrap();
        let ctx = RequestContext::new(Method::GET, url);
        assert_eq!(ctx.log_url(), "https://oauth2.example/tokeninfo");
        assert_eq!(ctx.url.query(), Some("id_token=secret"));
    }
}
