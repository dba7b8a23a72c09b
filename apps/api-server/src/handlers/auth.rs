//! Sign-in handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use folio_core::domain::{Profile, admit_sign_in, rules::normalize_email};
use folio_core::ports::BaseRepository;
use folio_shared::dto::{SessionResponse, SignInRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::envelope;
use crate::state::AppState;

/// POST /api/auth/google
///
/// Verify the Google ID token, apply the allow-list gate, upsert the
/// profile and issue a session token.
pub async fn google_sign_in(
    state: web::Data<AppState>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let verified = state.identity.verify(&req.id_token).await?;
    let email = normalize_email(&verified.email);

    let entry = state.allowed_emails.find_by_id(email.clone()).await?;
    let role = admit_sign_in(&email, entry.as_ref()).inspect_err(|e| {
        tracing::warn!(error = %e, "Sign-in refused by allow-list");
    })?;

    let name = verified
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    let profile = state.profiles.upsert(Profile::new(&email, name, role)).await?;

    let access_token = state
        .tokens
        .generate_token(profile.id, &profile.email, profile.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(profile_id = %profile.id, role = %profile.role, "Signed in");

    Ok(HttpResponse::Ok().json(envelope(SessionResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        profile,
    })))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .find_by_id(identity.profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(envelope(profile)))
}
