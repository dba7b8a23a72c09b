//! Authentication implementations.

mod google;
mod jwt;

pub use google::{GoogleConfig, GoogleIdentityVerifier};
pub use jwt::{JwtConfig, JwtTokenService};
