//! Authentication extractors and role checks.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use uuid::Uuid;

use folio_core::domain::{Role, admit_sign_in, rules::normalize_email};
use folio_core::ports::{AuthError, BaseRepository, TokenClaims};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated profile, taken from the session token.
///
/// The role is re-read from the allow-list on every request, so a
/// revoked or demoted entry takes effect before the token expires.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> AppResult<HttpResponse> {
///     identity.require_editor()?;
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub profile_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Identity {
    fn admitted(claims: TokenClaims, role: Role) -> Self {
        Self {
            profile_id: claims.profile_id,
            email: claims.email,
            role,
        }
    }

    /// Content management: master or editor.
    pub fn require_editor(&self) -> Result<(), AppError> {
        if self.role.can_edit_content() {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions.into())
        }
    }

    /// Allow-list management: master only.
    pub fn require_master(&self) -> Result<(), AppError> {
        if self.role.can_manage_access() {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions.into())
        }
    }
}

async fn authenticate(req: &HttpRequest) -> Result<Identity, AppError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".to_string())
    })?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    let claims: TokenClaims = state.tokens.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        e
    })?;

    let entry = state
        .allowed_emails
        .find_by_id(normalize_email(&claims.email))
        .await?;
    let role = admit_sign_in(&claims.email, entry.as_ref()).inspect_err(|e| {
        tracing::info!(profile_id = %claims.profile_id, reason = %e, "Session no longer admitted");
    })?;
    Ok(Identity::admitted(claims, role))
}

type ExtractFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>>>>;

impl FromRequest for Identity {
    type Error = AppError;
    type Future = ExtractFuture<Self, Self::Error>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate(&req).await })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    /// Whether the caller may see unpublished content.
    pub fn is_editor(&self) -> bool {
        self.0.as_ref().is_some_and(|i| i.role.can_edit_content())
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = ExtractFuture<Self, Self::Error>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(OptionalIdentity(authenticate(&req).await.ok())) })
    }
}
