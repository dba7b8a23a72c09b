//! Error taxonomy of the HTTP client.
//!
//! Every failed call ends in exactly one of: [`NetworkError`] (transport
//! failure or cancellation), [`ApiError`] (non-2xx status),
//! [`SchemaValidationError`] (2xx body of the wrong shape), or a
//! configuration / request-side error raised before anything is sent.

use std::fmt;

use http::{Method, StatusCode};
use serde_json::Value;
use validator::ValidationErrors;

use folio_core::ports::{ExecutorError, RequestContext};

use super::decoder::Decoded;

/// Maximum number of characters of a body kept in errors and logs.
pub const SNIPPET_LEN: usize = 180;

/// Message shown to end users when nothing more specific is known.
pub const GENERIC_USER_MESSAGE: &str = "Something went wrong. Please try again.";

/// Whitespace-collapsed prefix of `text`, at most [`SNIPPET_LEN`] chars.
pub fn snippet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SNIPPET_LEN {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(SNIPPET_LEN).collect();
    cut.push('…');
    cut
}

/// What went wrong below HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Connect,
    Timeout,
    Cancelled,
    Body,
    Transport,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NetworkErrorKind::Connect => "connection failed",
            NetworkErrorKind::Timeout => "timed out",
            NetworkErrorKind::Cancelled => "cancelled",
            NetworkErrorKind::Body => "response body unreadable",
            NetworkErrorKind::Transport => "transport error",
        };
        f.write_str(label)
    }
}

/// Transport failure or cancellation. Never retried by the client.
#[derive(Debug, thiserror::Error)]
#[error("{method} {url}: {kind}")]
pub struct NetworkError {
    pub method: Method,
    pub url: String,
    pub kind: NetworkErrorKind,
    #[source]
    pub source: ExecutorError,
}

impl NetworkError {
    pub(crate) fn from_executor(ctx: &RequestContext, source: ExecutorError) -> Self {
        let kind = match &source {
            ExecutorError::Connect(_) => NetworkErrorKind::Connect,
            ExecutorError::Timeout(_) => NetworkErrorKind::Timeout,
            ExecutorError::Cancelled => NetworkErrorKind::Cancelled,
            ExecutorError::Body(_) => NetworkErrorKind::Body,
            ExecutorError::Transport(_) => NetworkErrorKind::Transport,
        };
        Self {
            method: ctx.method.clone(),
            url: ctx.log_url(),
            kind,
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == NetworkErrorKind::Cancelled
    }
}

/// Non-2xx response.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    /// `error.message` of the envelope when present, else the status reason.
    pub message: String,
    /// `error.code` of the envelope when present.
    pub code: Option<String>,
    /// Truncated body text for logs and debugging.
    pub snippet: String,
    /// Parsed JSON body, if the body was JSON.
    pub body: Option<Value>,
}

impl ApiError {
    pub(crate) fn from_response(status: StatusCode, decoded: &Decoded) -> Self {
        let body = decoded.as_json().cloned();
        let envelope_error = body.as_ref().and_then(|b| b.get("error"));
        let message = envelope_error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .or_else(|| {
                body.as_ref()
                    .and_then(|b| b.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_owned)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        let code = envelope_error
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            status,
            message,
            code,
            snippet: snippet(&decoded.raw_text()),
            body,
        }
    }

    /// `error.details` of the envelope, if any.
    pub fn details(&self) -> Option<&Value> {
        self.body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.get("details"))
    }
}

/// Why a decoded body failed its schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaIssue {
    #[error("expected a JSON body, got {0}")]
    NotJson(&'static str),

    #[error("response envelope has no `data` field")]
    MissingData,

    #[error("shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("rule violation: {0}")]
    Rules(#[from] ValidationErrors),
}

/// A 2xx (or any status) body that does not match the declared schema.
#[derive(Debug, thiserror::Error)]
#[error("response of {url} (HTTP {status}) failed schema validation: {issue}")]
pub struct SchemaValidationError {
    /// Status actually returned with the offending body.
    pub status: StatusCode,
    pub url: String,
    #[source]
    pub issue: SchemaIssue,
    /// The body as received, for debugging.
    pub raw_body: String,
}

/// Every error the typed client can return.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request rejected before sending: {0}")]
    InvalidRequest(#[from] ValidationErrors),

    #[error("request body could not be encoded: {0}")]
    Encode(String),
}

impl HttpClientError {
    /// HTTP status tied to the failure, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpClientError::Api(e) => Some(e.status),
            HttpClientError::Schema(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpClientError::Network(e) if e.is_cancelled())
    }

    /// Message suitable for display to end users.
    pub fn user_message(&self) -> String {
        match self {
            HttpClientError::Api(e) if e.code.is_some() => e.message.clone(),
            HttpClientError::Api(e) if e.status == StatusCode::NOT_FOUND => {
                "The requested item could not be found.".to_string()
            }
            HttpClientError::Api(e) if e.status == StatusCode::UNAUTHORIZED => {
                "Please sign in to continue.".to_string()
            }
            HttpClientError::Api(e) if e.status == StatusCode::FORBIDDEN => {
                "You do not have permission to do that.".to_string()
            }
            HttpClientError::Network(e) if e.is_cancelled() => {
                "The request was cancelled.".to_string()
            }
            HttpClientError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            HttpClientError::InvalidRequest(_) => {
                "Some fields are invalid. Please review the form.".to_string()
            }
            _ => GENERIC_USER_MESSAGE.to_string(),
        }
    }
}
