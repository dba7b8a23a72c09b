//! Correlation middleware - `x-request-id` / `x-trace-id` for each request.
//!
//! Ids are taken from the request when present, generated otherwise, echoed
//! on the response and copied into every envelope built while the request
//! is being handled.

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::{
    Error, FromRequest, HttpMessage,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::Instrument;
use uuid::Uuid;

use folio_shared::ApiResponse;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Longest inbound id accepted before generating a fresh one.
const MAX_ID_LEN: usize = 128;

tokio::task_local! {
    static CURRENT: Correlation;
}

/// Correlation ids of the request being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub request_id: String,
    pub trace_id: String,
}

impl Correlation {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            request_id: inbound_id(headers, REQUEST_ID_HEADER),
            trace_id: inbound_id(headers, TRACE_ID_HEADER),
        }
    }

    /// Ids of the request whose handler is running, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }
}

fn inbound_id(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_ID_LEN)
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Wrap `data` in the success envelope, tagged with the current ids.
pub fn envelope<T>(data: T) -> ApiResponse<T> {
    match Correlation::current() {
        Some(c) => ApiResponse::ok(data).with_correlation(Some(c.request_id), Some(c.trace_id)),
        None => ApiResponse::ok(data),
    }
}

/// Middleware that resolves correlation ids for each request.
pub struct CorrelationMiddleware;

impl<S, B> Transform<S, ServiceRequest> for CorrelationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CorrelationService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorrelationService { service }))
    }
}

pub struct CorrelationService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CorrelationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let correlation = Correlation::from_headers(req.headers());
        req.extensions_mut().insert(correlation.clone());

        let span = tracing::info_span!(
            "request",
            request_id = %correlation.request_id,
            trace_id = %correlation.trace_id,
        );

        let fut = CURRENT.sync_scope(correlation.clone(), || self.service.call(req));
        let ids = correlation.clone();

        Box::pin(
            CURRENT
                .scope(correlation, async move {
                    let mut res = fut.await?;
                    let headers = res.headers_mut();
                    for (name, value) in [
                        (REQUEST_ID_HEADER, &ids.request_id),
                        (TRACE_ID_HEADER, &ids.trace_id),
                    ] {
                        if let Ok(value) = HeaderValue::from_str(value) {
                            headers.insert(HeaderName::from_static(name), value);
                        }
                    }
                    Ok(res)
                })
                .instrument(span),
        )
    }
}

/// Extractor for the current correlation ids.
impl FromRequest for Correlation {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut Payload) -> Self::Future {
        let correlation = req
            .extensions()
            .get::<Correlation>()
            .cloned()
            .unwrap_or_else(|| Correlation::from_headers(req.headers()));
        ready(Ok(correlation))
    }
}
