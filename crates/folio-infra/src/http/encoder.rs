//! Request encoding: URL resolution, query merging and body serialization.

use std::fmt;

use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use folio_core::ports::{EncodedBody, FormData};

use super::error::HttpClientError;

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::Float(n) => write!(f, "{n}"),
            QueryValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

macro_rules! int_query_value {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Int(i64::from(v))
            }
        })*
    };
}

int_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(n) => QueryValue::Int(n),
            Err(_) => QueryValue::Str(v.to_string()),
        }
    }
}

/// Ordered query parameters. Setting a key again replaces its value;
/// absent (`None` / `null`) values are never recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    pub fn set_opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Build from any value serializing to a flat JSON object of scalars.
    /// `null` fields are dropped.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, HttpClientError> {
        let json =
            serde_json::to_value(value).map_err(|e| HttpClientError::Encode(e.to_string()))?;
        let object = match json {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(HttpClientError::Encode(format!(
                    "query must serialize to an object, got {other}"
                )));
            }
        };

        let mut query = Self::new();
        for (key, value) in object {
            let value = match value {
                Value::Null => continue,
                Value::Bool(b) => QueryValue::Bool(b),
                Value::String(s) => QueryValue::Str(s),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => QueryValue::Int(i),
                    None => QueryValue::Str(n.to_string()),
                },
                Value::Array(_) | Value::Object(_) => {
                    return Err(HttpClientError::Encode(format!(
                        "query parameter '{key}' is not a scalar"
                    )));
                }
            };
            query.insert(key, value);
        }
        Ok(query)
    }

    /// Append `other`; its keys win over ours.
    pub fn merge(mut self, other: Query) -> Self {
        for (key, value) in other.pairs {
            self.insert(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, key: String, value: QueryValue) {
        self.pairs.retain(|(k, _)| *k != key);
        self.pairs.push((key, value));
    }
}

/// Request body: exactly one of the supported encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Form(FormData),
    UrlEncoded(Vec<(String, String)>),
    Binary {
        bytes: Bytes,
        content_type: Option<String>,
    },
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, HttpClientError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| HttpClientError::Encode(e.to_string()))
    }

    pub fn form(form: FormData) -> Self {
        Body::Form(form)
    }

    pub fn url_encoded<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::UrlEncoded(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn binary(bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        Body::Binary {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_owned),
        }
    }
}

/// Resolve `path` against `base` (or the ambient origin) and merge `query`
/// into its query string.
pub fn resolve_url(
    path: &str,
    base: Option<&Url>,
    ambient_origin: Option<&Url>,
    query: &Query,
) -> Result<Url, HttpClientError> {
    let mut url = match Url::parse(path) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.or(ambient_origin).ok_or_else(|| {
                HttpClientError::Configuration(format!(
                    "relative URL '{path}' requires a base URL, and none is configured"
                ))
            })?;
            base.join(path).map_err(|e| {
                HttpClientError::Configuration(format!("cannot join '{path}' onto {base}: {e}"))
            })?
        }
        Err(e) => {
            return Err(HttpClientError::Configuration(format!(
                "invalid URL '{path}': {e}"
            )));
        }
    };

    if query.is_empty() {
        return Ok(url);
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in query.pairs() {
        pairs.retain(|(k, _)| k != key);
        pairs.push((key.to_string(), value.to_string()));
    }
    url.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(url)
}

/// Serialize `body`, setting `content-type` to match. Form bodies get no
/// content type here: the runtime adds one with the multipart boundary.
pub fn encode_body(
    body: Option<Body>,
    headers: &mut HeaderMap,
) -> Result<EncodedBody, HttpClientError> {
    let Some(body) = body else {
        return Ok(EncodedBody::Empty);
    };

    match body {
        Body::Json(value) => {
            let bytes =
                serde_json::to_vec(&value).map_err(|e| HttpClientError::Encode(e.to_string()))?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Ok(EncodedBody::Bytes(Bytes::from(bytes)))
        }
        Body::UrlEncoded(pairs) => {
            let encoded = serde_urlencoded::to_string(&pairs)
                .map_err(|e| HttpClientError::Encode(e.to_string()))?;
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
            Ok(EncodedBody::Bytes(Bytes::from(encoded)))
        }
        Body::Binary {
            bytes,
            content_type,
        } => {
            if let Some(ct) = content_type {
                let value = HeaderValue::from_str(&ct).map_err(|e| {
                    HttpClientError::Encode(format!("invalid content type '{ct}': {e}"))
                })?;
                headers.insert(CONTENT_TYPE, value);
            } else if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                );
            }
            Ok(EncodedBody::Bytes(bytes))
        }
        Body::Form(form) => {
            headers.remove(CONTENT_TYPE);
            Ok(EncodedBody::Multipart(form))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn base() -> Url {
        Url::parse("https://blog.example.com").unwrap()
    }

    #[test]
    fn test_null_values_are_dropped() {
        let query = Query::from_serialize(&json!({ "a": 1, "b": null, "c": "x" })).unwrap();
        let url = resolve_url("/api/posts", Some(&base()), None, &query).unwrap();

        let parsed: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["a"], "1");
        assert_eq!(parsed["c"], "x");
        assert!(!url.as_str().contains("b="));
        assert!(!url.as_str().contains("null"));
    }

    #[test]
    fn test_set_opt_none_is_skipped() {
        let query = Query::new()
            .set("page", 2u64)
            .set_opt::<&str>("category", None)
            .set("onlyVisible", true);
        let url = resolve_url("/api/categories", Some(&base()), None, &query).unwrap();
        assert_eq!(url.query(), Some("page=2&onlyVisible=true"));
    }

    #[test]
    fn test_later_keys_overwrite_earlier() {
        let query = Query::new().set("page", 3u32);
        let url = resolve_url("/api/posts?page=1&size=5", Some(&base()), None, &query).unwrap();
        assert_eq!(url.query(), Some("size=5&page=3"));

        let merged = Query::new().set("a", 1).merge(Query::new().set("a", 2));
        assert_eq!(merged.pairs().count(), 1);
        assert_eq!(merged.pairs().next().unwrap().1, &QueryValue::Int(2));
    }

    #[test]
    fn test_relative_without_base_is_configuration_error() {
        let err = resolve_url("/api/posts", None, None, &Query::new()).unwrap_err();
        assert!(matches!(err, HttpClientError::Configuration(_)));
    }

    #[test]
    fn test_ambient_origin_used_when_no_base() {
        let url = resolve_url("/rss.xml", None, Some(&base()), &Query::new()).unwrap();
        assert_eq!(url.as_str(), "https://blog.example.com/rss.xml");
    }

    #[test]
    fn test_absolute_url_ignores_base() {
        let url = resolve_url("https://other.example.org/x", Some(&base()), None, &Query::new())
            .unwrap();
        assert_eq!(url.host_str(), Some("other.example.org"));
    }

    #[test]
    fn test_nested_query_rejected() {
        let err = Query::from_serialize(&json!({ "a": [1, 2] })).unwrap_err();
        assert!(matches!(err, HttpClientError::Encode(_)));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let payload = json!({ "name": "Tech", "slug": "tech" });
        let mut headers = HeaderMap::new();
        let body = encode_body(Some(Body::json(&payload).unwrap()), &mut headers).unwrap();

        assert_eq!(headers[CONTENT_TYPE], "application/json");
        match body {
            EncodedBody::Bytes(bytes) => {
                assert_eq!(bytes, Bytes::from(serde_json::to_vec(&payload).unwrap()));
            }
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_form_body_has_no_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let form = FormData::new().text("title", "Hello");
        let body = encode_body(Some(Body::form(form.clone())), &mut headers).unwrap();

        assert!(!headers.contains_key(CONTENT_TYPE));
        assert_eq!(body, EncodedBody::Multipart(form));
    }

    #[test]
    fn test_url_encoded_body() {
        let mut headers = HeaderMap::new();
        let body = encode_body(
            Some(Body::url_encoded([("q", "a b"), ("n", "1")])),
            &mut headers,
        )
        .unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(body, EncodedBody::Bytes(Bytes::from("q=a+b&n=1")));
    }

    #[test]
    fn test_binary_body_defaults_to_octet_stream() {
        let mut headers = HeaderMap::new();
        encode_body(Some(Body::binary(vec![0u8, 1], None)), &mut headers).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");

        let mut headers = HeaderMap::new();
        encode_body(Some(Body::binary(vec![0u8], Some("image/png"))), &mut headers).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "image/png");
    }

    #[test]
    fn test_no_body() {
        let mut headers = HeaderMap::new();
        assert_eq!(encode_body(None, &mut headers).unwrap(), EncodedBody::Empty);
        assert!(headers.is_empty());
    }
}
