//! Allow-list administration. Every route requires a master session.

use actix_web::{HttpResponse, web};
use validator::Validate;

use folio_core::domain::{AllowedEmail, rules::normalize_email};
use folio_core::ports::BaseRepository;
use folio_shared::dto::InviteRequest;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::envelope;
use crate::state::AppState;

/// GET /api/admin/allowed-emails
pub async fn list_allowed_emails(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    identity.require_master()?;
    let entries = state.allowed_emails.list().await?;
    Ok(HttpResponse::Ok().json(envelope(entries)))
}

/// POST /api/admin/allowed-emails
///
/// Inviting an address that is already listed replaces its role and flag.
pub async fn invite(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<InviteRequest>,
) -> AppResult<HttpResponse> {
    identity.require_master()?;
    let req = body.into_inner();
    req.validate()?;

    let mut entry = AllowedEmail::invite(&req.email, req.role, Some(identity.profile_id));
    entry.is_login_allowed = req.is_login_allowed;
    let saved = state.allowed_emails.save(entry).await?;

    tracing::info!(email = %saved.email, role = %saved.role, by = %identity.email, "Allow-list entry saved");
    Ok(HttpResponse::Created().json(envelope(saved)))
}

/// DELETE /api/admin/allowed-emails/{email}
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    identity.require_master()?;
    let email = normalize_email(&path.into_inner());

    if email == normalize_email(&identity.email) {
        return Err(AppError::Forbidden(
            "You cannot remove your own allow-list entry.".to_string(),
        ));
    }

    state.allowed_emails.delete(email.clone()).await?;
    tracing::info!(email = %email, by = %identity.email, "Allow-list entry removed");
    Ok(HttpResponse::NoContent().finish())
}
