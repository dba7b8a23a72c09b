//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use folio_core::domain::{
    AllowedEmail, Category, CategoryDraft, Post, PostDraft, PostFilter, PostPage, Profile,
    SortOrderUpdate,
};
use folio_core::error::RepoError;
use folio_core::ports::{
    AllowedEmailRepository, CategoryRepository, PostRepository, ProfileRepository,
};

use super::entity::allowed_email::{self, Entity as AllowedEmailEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity, keywords_to_json};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;
pub type PostgresAllowedEmailRepository = PostgresBaseRepository<AllowedEmailEntity>;

/// Mask the local part of an email for logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

fn write_post(model: &mut post::ActiveModel, draft: PostDraft) {
    model.category_id = Set(draft.category_id);
    model.title = Set(draft.title);
    model.slug = Set(draft.slug);
    model.description = Set(draft.description);
    model.keywords = Set(keywords_to_json(draft.keywords));
    model.thumbnail_url = Set(draft.thumbnail_url);
    model.content = Set(draft.content);
    model.is_published = Set(draft.is_published);
    model.updated_at = Set(Utc::now().into());
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &PostFilter) -> Result<PostPage, RepoError> {
        let mut query = PostEntity::find();
        if filter.published_only {
            query = query.filter(post::Column::IsPublished.eq(true));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(post::Column::CategoryId.eq(category_id));
        }

        let paginator = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, filter.page_size.max(1));

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let items = paginator
            .fetch_page(filter.page.saturating_sub(1))
            .await
            .map_err(map_db_err)?;

        tracing::debug!(
            page = filter.page,
            returned = items.len(),
            total,
            "Listed posts"
        );

        Ok(PostPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn create(&self, draft: PostDraft) -> Result<Post, RepoError> {
        let now = Utc::now();
        let mut model = post::ActiveModel {
            id: NotSet,
            created_at: Set(now.into()),
            ..Default::default()
        };
        write_post(&mut model, draft);
        let created = model.insert(&self.db).await.map_err(map_db_err)?;
        Ok(created.into())
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut model = existing.into_active_model();
        write_post(&mut model, draft);
        let updated = model.update(&self.db).await.map_err(map_db_err)?;
        Ok(updated.into())
    }

    async fn count_in_category(&self, category_id: i64) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

fn write_category(model: &mut category::ActiveModel, draft: CategoryDraft) {
    model.name = Set(draft.name);
    model.slug = Set(draft.slug);
    model.description = Set(draft.description);
    if let Some(order) = draft.sort_order {
        model.sort_order = Set(order);
    }
    model.is_visible = Set(draft.is_visible);
    model.updated_at = Set(Utc::now().into());
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self, only_visible: bool) -> Result<Vec<Category>, RepoError> {
        let mut query = CategoryEntity::find();
        if only_visible {
            query = query.filter(category::Column::IsVisible.eq(true));
        }
        let rows = query
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
        // New categories go last unless the draft picks a position.
        let next_order = CategoryEntity::find()
            .order_by_desc(category::Column::SortOrder)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map_or(0, |last| last.sort_order + 1);

        let now = Utc::now();
        let mut model = category::ActiveModel {
            id: NotSet,
            sort_order: Set(next_order),
            created_at: Set(now.into()),
            ..Default::default()
        };
        write_category(&mut model, draft);
        let created = model.insert(&self.db).await.map_err(map_db_err)?;
        Ok(created.into())
    }

    async fn update(&self, id: i64, draft: CategoryDraft) -> Result<Category, RepoError> {
        let existing = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut model = existing.into_active_model();
        write_category(&mut model, draft);
        let updated = model.update(&self.db).await.map_err(map_db_err)?;
        Ok(updated.into())
    }

    async fn reorder(&self, updates: &[SortOrderUpdate]) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let now = Utc::now();

        for update in updates {
            let result = CategoryEntity::update_many()
                .col_expr(category::Column::SortOrder, Expr::value(update.sort_order))
                .col_expr(category::Column::UpdatedAt, Expr::value(now))
                .filter(category::Column::Id.eq(update.id))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;

            if result.rows_affected == 0 {
                // Dropping the transaction rolls it back.
                tracing::warn!(category_id = update.id, "Reorder references unknown category");
                return Err(RepoError::NotFound);
            }
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(count = updates.len(), "Categories reordered");
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, RepoError> {
        tracing::debug!(email = %mask_email(email), "Finding profile by email");

        let result = ProfileEntity::find()
            .filter(profile::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.map(Into::into))
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, RepoError> {
        let model: profile::ActiveModel = profile.into();
        let saved = ProfileEntity::insert(model)
            .on_conflict(
                OnConflict::column(profile::Column::Email)
                    .update_columns([
                        profile::Column::Name,
                        profile::Column::Role,
                        profile::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(saved.into())
    }
}

#[async_trait]
impl AllowedEmailRepository for PostgresAllowedEmailRepository {
    async fn list(&self) -> Result<Vec<AllowedEmail>, RepoError> {
        let rows = AllowedEmailEntity::find()
            .order_by_asc(allowed_email::Column::Email)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, entry: AllowedEmail) -> Result<AllowedEmail, RepoError> {
        let model: allowed_email::ActiveModel = entry.into();
        let saved = AllowedEmailEntity::insert(model)
            .on_conflict(
                OnConflict::column(allowed_email::Column::Email)
                    .update_columns([
                        allowed_email::Column::Role,
                        allowed_email::Column::InvitedBy,
                        allowed_email::Column::IsLoginAllowed,
                        allowed_email::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(saved.into())
    }
}
