//! # Folio Shared
//!
//! Wire types shared between the API server and the typed HTTP client:
//! the response envelope, query parameters and request/response bodies.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorBody, ErrorResponse};
