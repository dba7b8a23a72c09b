//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod executor;
mod repository;

pub use auth::{AuthError, IdentityVerifier, TokenClaims, TokenService, VerifiedIdentity};
pub use cache::{Cache, CacheError};
pub use executor::{
    BoxError, CacheHints, EncodedBody, ExecutorError, FormData, FormPart, HttpExecutor,
    HttpRequest, HttpResponse, RequestContext, ResponseBody,
};
pub use repository::{
    AllowedEmailRepository, BaseRepository, CategoryRepository, PostRepository,
    ProfileRepository,
};
