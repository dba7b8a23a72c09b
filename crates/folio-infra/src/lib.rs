//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`: the typed
//! HTTP client pipeline, resource clients, cache, persistence and auth.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No database or auth backends, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT sessions and Google ID-token verification

pub mod api;
pub mod cache;
pub mod database;
pub mod http;

#[cfg(feature = "auth")]
pub mod auth;

pub use api::{CategoriesClient, PostsClient, QueryCache};
pub use cache::InMemoryCache;
pub use http::{ApiClient, ClientConfig, HttpClientError};

#[cfg(feature = "auth")]
pub use auth::{GoogleIdentityVerifier, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;
