//! Response decoding: choose a parse mode and read the body exactly once.

use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

use folio_core::ports::{ExecutorError, HttpResponse};

/// Caller override for how to read a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAs {
    Json,
    Text,
    /// Raw bytes (PDFs, octet streams).
    Bytes,
    /// Raw bytes tagged with their media type (images, video).
    Blob,
}

impl ParseAs {
    /// Pick a parse mode from a `content-type` header.
    ///
    /// `None` means unknown: try JSON, fall back to text.
    pub fn sniff(content_type: Option<&str>) -> Option<Self> {
        let media = media_type(content_type?);
        if media == "application/json" || media.ends_with("+json") {
            Some(ParseAs::Json)
        } else if media.starts_with("text/") {
            Some(ParseAs::Text)
        } else if media == "application/octet-stream" || media == "application/pdf" {
            Some(ParseAs::Bytes)
        } else if media.starts_with("image/") || media.starts_with("video/") {
            Some(ParseAs::Blob)
        } else {
            None
        }
    }
}

/// Lowercased media type without parameters.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// No body (204/205, or an empty JSON body). Reads as JSON `null`.
    Empty,
    Json(Value),
    Text(String),
    Bytes(Bytes),
    Blob { content_type: String, bytes: Bytes },
}

impl Decoded {
    pub fn kind(&self) -> &'static str {
        match self {
            Decoded::Empty => "an empty body",
            Decoded::Json(_) => "JSON",
            Decoded::Text(_) => "text",
            Decoded::Bytes(_) => "binary data",
            Decoded::Blob { .. } => "a blob",
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Decoded::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Decoded::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Decoded::Empty)
    }

    /// Body rendered as text for logs and error reports.
    pub fn raw_text(&self) -> String {
        match self {
            Decoded::Empty => String::new(),
            Decoded::Json(v) => v.to_string(),
            Decoded::Text(t) => t.clone(),
            Decoded::Bytes(b) | Decoded::Blob { bytes: b, .. } => {
                String::from_utf8_lossy(b).into_owned()
            }
        }
    }
}

/// Statuses whose body is never read.
pub fn is_bodyless(status: StatusCode) -> bool {
    status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT
}

/// Decode a response. An explicit `parse_as` wins over content-type sniffing.
pub async fn decode(
    response: HttpResponse,
    parse_as: Option<ParseAs>,
) -> Result<Decoded, ExecutorError> {
    if is_bodyless(response.status) {
        return Ok(Decoded::Empty);
    }

    let content_type = response.content_type().map(str::to_owned);
    let mode = parse_as.or_else(|| ParseAs::sniff(content_type.as_deref()));
    let bytes = response.bytes().await?;

    Ok(match mode {
        Some(ParseAs::Json) | None => json_or_text(bytes),
        Some(ParseAs::Text) => Decoded::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Some(ParseAs::Bytes) => Decoded::Bytes(bytes),
        Some(ParseAs::Blob) => Decoded::Blob {
            content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes,
        },
    })
}

fn json_or_text(bytes: Bytes) -> Decoded {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Decoded::Empty;
    }
    match serde_json::from_slice(&bytes) {
        Ok(value) => Decoded::Json(value),
        Err(e) => {
            tracing::debug!(error = %e, "response body is not JSON, keeping it as text");
            Decoded::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}
