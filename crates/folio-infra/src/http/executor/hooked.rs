//! Interactive-runtime executor: reqwest plus before/after hooks.
//!
//! Cache hints are ignored here; hooks observe or amend each request.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use http::header::{HeaderName, HeaderValue};

use folio_core::ports::{
    ExecutorError, HttpExecutor, HttpRequest, HttpResponse, RequestContext,
};

use super::convert::{build_request, into_response, map_reqwest_error};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Observer around each exchange. Default methods do nothing.
pub trait ExecutorHook: Send + Sync {
    fn before_request(&self, _ctx: &RequestContext, _request: &mut HttpRequest) {}

    fn after_response(&self, _ctx: &RequestContext, _status: StatusCode) {}

    fn on_error(&self, _ctx: &RequestContext, _error: &ExecutorError) {}
}

/// Logs every exchange at debug level.
#[derive(Debug, Default)]
pub struct TracingHook;

impl ExecutorHook for TracingHook {
    fn before_request(&self, ctx: &RequestContext, _request: &mut HttpRequest) {
        tracing::debug!(request_id = %ctx.id, method = %ctx.method, url = %ctx.log_url(), "Sending request");
    }

    fn after_response(&self, ctx: &RequestContext, status: StatusCode) {
        tracing::debug!(
            request_id = %ctx.id,
            status = status.as_u16(),
            elapsed_ms = ctx.elapsed_ms() as u64,
            "Received response"
        );
    }

    fn on_error(&self, ctx: &RequestContext, error: &ExecutorError) {
        tracing::debug!(request_id = %ctx.id, error = %error, "Exchange failed");
    }
}

/// Stamps `x-request-id` with the call's id unless the caller set one.
#[derive(Debug, Default)]
pub struct RequestIdHook;

impl ExecutorHook for RequestIdHook {
    fn before_request(&self, ctx: &RequestContext, request: &mut HttpRequest) {
        if request.headers.contains_key(REQUEST_ID_HEADER) {
            return;
        }
        if let Ok(value) = HeaderValue::from_str(&ctx.id.to_string()) {
            request.headers.insert(REQUEST_ID_HEADER, value);
        }
    }
}

#[derive(Clone)]
pub struct HookedExecutor {
    client: reqwest::Client,
    hooks: Vec<Arc<dyn ExecutorHook>>,
}

impl HookedExecutor {
    /// Executor with the default tracing and request-id hooks.
    pub fn new() -> Self {
        Self::bare()
            .with_hook(Arc::new(RequestIdHook))
            .with_hook(Arc::new(TracingHook))
    }

    /// Executor without any hooks.
    pub fn bare() -> Self {
        Self {
            client: reqwest::Client::new(),
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn ExecutorHook>) -> Self {
        self.hooks.push(hook);
        self
    }
}

impl Default for HookedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpExecutor for HookedExecutor {
    async fn execute(
        &self,
        mut request: HttpRequest,
        ctx: &RequestContext,
    ) -> Result<HttpResponse, ExecutorError> {
        for hook in &self.hooks {
            hook.before_request(ctx, &mut request);
        }

        let sent = match build_request(&self.client, request) {
            Ok(builder) => builder.send().await.map_err(map_reqwest_error),
            Err(e) => Err(e),
        };

        match sent {
            Ok(response) => {
                for hook in &self.hooks {
                    hook.after_response(ctx, response.status());
                }
                Ok(into_response(response))
            }
            Err(error) => {
                for hook in &self.hooks {
                    hook.on_error(ctx, &error);
                }
                Err(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "hooked"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ports::{CacheHints, EncodedBody};
    use http::{HeaderMap, Method};
    use url::Url;

    fn request() -> (HttpRequest, RequestContext) {
        let url = Url::parse("http://localhost/api/posts").unwrap();
        let request = HttpRequest {
            method: Method::GET,
            url: url.clone(),
            headers: HeaderMap::new(),
            body: EncodedBody::Empty,
            cache: CacheHints::default(),
            timeout: None,
        };
        (request, RequestContext::new(Method::GET, url))
    }

    #[test]
    fn test_request_id_hook_sets_header() {
        let (mut req, ctx) = request();
        RequestIdHook.before_request(&ctx, &mut req);
        assert_eq!(req.headers[REQUEST_ID_HEADER], ctx.id.to_string().as_str());
    }

    #[test]
    fn test_request_id_hook_keeps_caller_value() {
        let (mut req, ctx) = request();
        req.headers
            .insert(REQUEST_ID_HEADER, HeaderValue::from_static("from-caller"));
        RequestIdHook.before_request(&ctx, &mut req);
        assert_eq!(req.headers[REQUEST_ID_HEADER], "from-caller");
    }
}
