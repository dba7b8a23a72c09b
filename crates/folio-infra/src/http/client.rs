//! Typed client facade: one entry point per HTTP verb.
//!
//! Every call resolves its URL, encodes its body, runs the exchange on the
//! configured [`HttpExecutor`], decodes the response and, when a schema is
//! supplied, validates it. Failures are logged once here and returned.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use tokio_util::sync::CancellationToken;
use url::Url;

use folio_core::ports::{CacheHints, ExecutorError, HttpExecutor, HttpRequest, RequestContext};

use super::decoder::{Decoded, ParseAs, decode};
use super::encoder::{Body, Query, encode_body, resolve_url};
use super::error::{
    ApiError, HttpClientError, NetworkError, SchemaValidationError, snippet,
};
use super::executor::{HookedExecutor, NativeExecutor};
use super::schema::Schema;

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base for relative request paths.
    pub base_url: Option<Url>,
    /// Fallback origin when no base URL is set (the site the client runs on).
    pub ambient_origin: Option<Url>,
    /// Default per-request timeout.
    pub timeout: Option<Duration>,
    /// Headers sent with every request; per-call headers override them.
    pub default_headers: HeaderMap,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: url_from_env("API_BASE_URL"),
            ambient_origin: url_from_env("SITE_URL"),
            timeout: Some(Duration::from_secs(
                env::var("API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            )),
            default_headers: HeaderMap::new(),
        }
    }
}

fn url_from_env(key: &str) -> Option<Url> {
    let raw = env::var(key).ok()?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid URL in environment");
            None
        }
    }
}

/// Explicitly constructed API client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    executor: Arc<dyn HttpExecutor>,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(executor: Arc<dyn HttpExecutor>, config: ClientConfig) -> Self {
        Self {
            executor,
            config: Arc::new(config),
        }
    }

    /// Client for server-side use, honoring cache hints.
    pub fn native(config: ClientConfig) -> Self {
        Self::new(Arc::new(NativeExecutor::new()), config)
    }

    /// Client with logging and request-id hooks.
    pub fn hooked(config: ClientConfig) -> Self {
        Self::new(Arc::new(HookedExecutor::new()), config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Copy of this client sending `name: value` on every request.
    pub fn with_default_header(&self, name: HeaderName, value: HeaderValue) -> Self {
        let mut config = (*self.config).clone();
        config.default_headers.insert(name, value);
        Self {
            executor: Arc::clone(&self.executor),
            config: Arc::new(config),
        }
    }

    /// Copy of this client authenticating with a bearer token.
    pub fn with_bearer(&self, token: &str) -> Result<Self, HttpClientError> {
        let value = bearer_value(token)?;
        Ok(self.with_default_header(AUTHORIZATION, value))
    }

    pub fn get(&self, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, path, None)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::DELETE, path, None)
    }

    pub fn post(&self, path: &str, body: Body) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, path, Some(body))
    }

    pub fn put(&self, path: &str, body: Body) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, path, Some(body))
    }

    pub fn patch(&self, path: &str, body: Body) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PATCH, path, Some(body))
    }
}

fn bearer_value(token: &str) -> Result<HeaderValue, HttpClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| HttpClientError::Configuration("bearer token is not a valid header".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// One pending call. Bodies are fixed by the verb constructor.
#[must_use = "a request does nothing until `send` or `send_as` is awaited"]
pub struct RequestBuilder<'a> {
    client: &'a ApiClient,
    method: Method,
    path: String,
    body: Option<Body>,
    query: Query,
    headers: HeaderMap,
    parse_as: Option<ParseAs>,
    cancel: Option<CancellationToken>,
    cache: CacheHints,
    timeout: Option<Duration>,
    pending_error: Option<HttpClientError>,
}

impl<'a> RequestBuilder<'a> {
    fn new(client: &'a ApiClient, method: Method, path: &str, body: Option<Body>) -> Self {
        Self {
            client,
            method,
            path: path.to_string(),
            body,
            query: Query::new(),
            headers: HeaderMap::new(),
            parse_as: None,
            cancel: None,
            cache: CacheHints::default(),
            timeout: None,
            pending_error: None,
        }
    }

    /// Merge query parameters; later keys overwrite earlier ones.
    pub fn query(mut self, query: Query) -> Self {
        self.query = self.query.merge(query);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn bearer_auth(mut self, token: &str) -> Self {
        match bearer_value(token) {
            Ok(value) => {
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => self.pending_error = Some(e),
        }
        self
    }

    /// Override content-type sniffing.
    pub fn parse_as(mut self, mode: ParseAs) -> Self {
        self.parse_as = Some(mode);
        self
    }

    /// Abort the call when `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn cache(mut self, hints: CacheHints) -> Self {
        self.cache = hints;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send and return the decoded body without schema validation.
    pub async fn send(self) -> Result<Decoded, HttpClientError> {
        self.dispatch().await.map(|(decoded, _)| decoded)
    }

    /// Send and validate a successful body against `schema`.
    pub async fn send_as<S: Schema>(self, schema: &S) -> Result<S::Output, HttpClientError> {
        let (decoded, exchange) = self.dispatch().await?;
        schema.parse(&decoded).map_err(|issue| {
            let err = SchemaValidationError {
                status: exchange.status,
                url: exchange.ctx.log_url(),
                issue,
                raw_body: decoded.raw_text(),
            };
            tracing::warn!(
                method = %exchange.ctx.method,
                url = %exchange.ctx.log_url(),
                status = exchange.status.as_u16(),
                elapsed_ms = exchange.ctx.elapsed_ms() as u64,
                snippet = %snippet(&err.raw_body),
                error = %err.issue,
                "Response failed schema validation"
            );
            HttpClientError::Schema(err)
        })
    }

    async fn dispatch(self) -> Result<(Decoded, Exchange), HttpClientError> {
        let RequestBuilder {
            client,
            method,
            path,
            body,
            query,
            headers,
            parse_as,
            cancel,
            cache,
            timeout,
            pending_error,
        } = self;

        if let Some(err) = pending_error {
            tracing::error!(method = %method, path = %path, error = %err, "Request could not be built");
            return Err(err);
        }

        let config = &client.config;
        let url = resolve_url(
            &path,
            config.base_url.as_ref(),
            config.ambient_origin.as_ref(),
            &query,
        )
        .inspect_err(|e| {
            tracing::error!(method = %method, path = %path, error = %e, "Request URL could not be resolved");
        })?;

        let ctx = RequestContext::new(method.clone(), url.clone());
        let mut merged = config.default_headers.clone();
        merged.extend(headers);
        let encoded = encode_body(body, &mut merged).inspect_err(|e| {
            tracing::error!(method = %method, url = %ctx.log_url(), error = %e, "Request body could not be encoded");
        })?;

        let request = HttpRequest {
            method,
            url,
            headers: merged,
            body: encoded,
            cache,
            timeout: timeout.or(config.timeout),
        };

        tracing::debug!(
            request_id = %ctx.id,
            method = %ctx.method,
            url = %ctx.log_url(),
            executor = client.executor.name(),
            "HTTP request started"
        );

        let exchange = async {
            let response = client.executor.execute(request, &ctx).await?;
            let status = response.status;
            let decoded = decode(response, parse_as).await?;
            Ok::<_, ExecutorError>((status, decoded))
        };

        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ExecutorError::Cancelled),
                result = exchange => result,
            },
            None => exchange.await,
        };

        let (status, decoded) = match outcome {
            Ok(done) => done,
            Err(source) => {
                let err = NetworkError::from_executor(&ctx, source);
                tracing::error!(
                    request_id = %ctx.id,
                    method = %ctx.method,
                    url = %ctx.log_url(),
                    elapsed_ms = ctx.elapsed_ms() as u64,
                    error = %err.source,
                    "HTTP request failed"
                );
                return Err(err.into());
            }
        };

        if !status.is_success() {
            let err = ApiError::from_response(status, &decoded);
            tracing::warn!(
                request_id = %ctx.id,
                method = %ctx.method,
                url = %ctx.log_url(),
                status = status.as_u16(),
                elapsed_ms = ctx.elapsed_ms() as u64,
                snippet = %err.snippet,
                "HTTP request returned an error status"
            );
            return Err(err.into());
        }

        tracing::debug!(
            request_id = %ctx.id,
            status = status.as_u16(),
            elapsed_ms = ctx.elapsed_ms() as u64,
            body = decoded.kind(),
            "HTTP request completed"
        );

        Ok((decoded, Exchange { status, ctx }))
    }
}

struct Exchange {
    status: http::StatusCode,
    ctx: RequestContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_bearer_marks_sensitive() {
        let client = ApiClient::native(ClientConfig::new(Url::parse("http://localhost").unwrap()))
            .with_bearer("abc")
            .unwrap();
        let value = &client.config().default_headers[AUTHORIZATION];
        assert_eq!(value, "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_bearer_with_newline_rejected() {
        let client = ApiClient::native(ClientConfig::default());
        assert!(matches!(
            client.with_bearer("bad\ntoken"),
            Err(HttpClientError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_relative_path_without_base_fails_fast() {
        let client = ApiClient::native(ClientConfig::default());
        let err = client.get("/api/posts").send().await.unwrap_err();
        assert!(matches!(err, HttpClientError::Configuration(_)));
    }
}
