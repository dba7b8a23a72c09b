//! Category handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use folio_core::domain::{CategoryDraft, SortOrderUpdate};
use folio_core::ports::BaseRepository;
use folio_shared::dto::{CategoryListQuery, validate_each};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::observability::envelope;
use crate::state::AppState;

/// GET /api/categories
///
/// Hidden categories are listed only for editors who pass `onlyVisible=false`.
pub async fn list_categories(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<CategoryListQuery>,
) -> AppResult<HttpResponse> {
    let only_visible = query.only_visible.unwrap_or(true) || !viewer.is_editor();
    let categories = state.categories.list(only_visible).await?;
    Ok(HttpResponse::Ok().json(envelope(categories)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .filter(|c| c.is_visible || viewer.is_editor())
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))?;
    Ok(HttpResponse::Ok().json(envelope(category)))
}

/// POST /api/categories
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryDraft>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let draft = body.into_inner();
    draft.validate()?;

    let category = state.categories.create(draft).await?;
    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok(HttpResponse::Created().json(envelope(category)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<CategoryDraft>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let draft = body.into_inner();
    draft.validate()?;

    let category = state.categories.update(path.into_inner(), draft).await?;
    Ok(HttpResponse::Ok().json(envelope(category)))
}

/// DELETE /api/categories/{id}
///
/// Refused with 409 while posts still reference the category.
pub async fn delete_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let id = path.into_inner();

    let in_use = state.posts.count_in_category(id).await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Category {id} still has {in_use} post(s). Move or delete them first."
        )));
    }

    state.categories.delete(id).await?;
    tracing::info!(category_id = id, by = %identity.email, "Category deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/categories/order
pub async fn reorder_categories(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Vec<SortOrderUpdate>>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let updates = body.into_inner();
    validate_each(&updates)?;

    state.categories.reorder(&updates).await?;
    let categories = state.categories.list(false).await?;
    Ok(HttpResponse::Ok().json(envelope(categories)))
}
