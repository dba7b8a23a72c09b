//! Typed HTTP client pipeline: encoder, executors, decoder, schema
//! validation and the [`ApiClient`] facade tying them together.

pub mod client;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod schema;

pub use client::{ApiClient, ClientConfig, RequestBuilder};
pub use decoder::{Decoded, ParseAs};
pub use encoder::{Body, Query, QueryValue};
pub use error::{
    ApiError, HttpClientError, NetworkError, NetworkErrorKind, SchemaIssue, SchemaValidationError,
};
pub use executor::{ExecutorHook, HookedExecutor, NativeExecutor};
pub use schema::{Schema, data, typed, validated, validated_list};
