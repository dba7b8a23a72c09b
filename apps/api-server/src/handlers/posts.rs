//! Post handlers.

use actix_web::{HttpResponse, web};
use validator::{Validate, ValidationError, ValidationErrors};

use folio_core::domain::{PostDraft, PostFilter};
use folio_core::domain::rules::is_valid_slug;
use folio_core::ports::BaseRepository;
use folio_shared::dto::{Page, PostListQuery};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::observability::envelope;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    query.validate()?;

    let include_unpublished = query.include_unpublished.unwrap_or(false);
    if include_unpublished && !viewer.is_editor() {
        return Err(AppError::Forbidden(
            "Unpublished posts require an editor session.".to_string(),
        ));
    }

    let category_id = match &query.category {
        Some(slug) => {
            let category = state
                .categories
                .find_by_slug(slug)
                .await?
                .filter(|c| c.is_visible || viewer.is_editor())
                .ok_or_else(|| AppError::NotFound(format!("Category {slug} not found")))?;
            Some(category.id)
        }
        None => None,
    };

    let filter = PostFilter {
        category_id,
        published_only: !include_unpublished,
        page: query.page(),
        page_size: query.page_size(),
    };
    let page = state.posts.list(&filter).await?;

    Ok(HttpResponse::Ok().json(envelope(Page::new(
        page.items,
        filter.page,
        filter.page_size,
        page.total,
    ))))
}

/// GET /api/posts/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let not_found = || AppError::NotFound(format!("Post {slug} not found"));
    if !is_valid_slug(&slug) {
        return Err(not_found());
    }

    let post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .filter(|p| p.is_published || viewer.is_editor())
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(envelope(post)))
}

/// Validate a draft, including that its category exists.
async fn check_draft(state: &AppState, draft: &PostDraft) -> AppResult<()> {
    draft.validate()?;
    if state.categories.find_by_id(draft.category_id).await?.is_none() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("unknown_category");
        err.message = Some("Category does not exist".into());
        errors.add("categoryId", err);
        return Err(errors.into());
    }
    Ok(())
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostDraft>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let draft = body.into_inner();
    check_draft(&state, &draft).await?;

    let post = state.posts.create(draft).await?;
    tracing::info!(post_id = post.id, slug = %post.slug, by = %identity.email, "Post created");

    Ok(HttpResponse::Created().json(envelope(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<PostDraft>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let id = path.into_inner();
    let draft = body.into_inner();
    check_draft(&state, &draft).await?;

    let post = state.posts.update(id, draft).await?;
    tracing::info!(post_id = id, by = %identity.email, "Post updated");

    Ok(HttpResponse::Ok().json(envelope(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    identity.require_editor()?;
    let id = path.into_inner();
    state.posts.delete(id).await?;
    tracing::info!(post_id = id, by = %identity.email, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
