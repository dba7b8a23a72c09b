use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AllowedEmail, Category, CategoryDraft, Post, PostDraft, PostFilter, PostPage, Profile,
    SortOrderUpdate,
};
use crate::error::RepoError;

/// Generic repository trait shared by every stored record.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Newest first, filtered and paginated.
    async fn list(&self, filter: &PostFilter) -> Result<PostPage, RepoError>;

    async fn create(&self, draft: PostDraft) -> Result<Post, RepoError>;

    /// Full overwrite of the writable fields.
    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError>;

    async fn count_in_category(&self, category_id: i64) -> Result<u64, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, i64> {
    /// All categories in display order.
    async fn list(&self, only_visible: bool) -> Result<Vec<Category>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError>;

    async fn update(&self, id: i64, draft: CategoryDraft) -> Result<Category, RepoError>;

    /// Bulk upsert of `sort_order` keyed by id; all or nothing.
    async fn reorder(&self, updates: &[SortOrderUpdate]) -> Result<(), RepoError>;
}

/// Profile repository.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, RepoError>;

    /// Insert, or update name and role of the profile with the same email.
    async fn upsert(&self, profile: Profile) -> Result<Profile, RepoError>;
}

/// Allow-list repository, keyed by normalized email.
#[async_trait]
pub trait AllowedEmailRepository: BaseRepository<AllowedEmail, String> {
    async fn list(&self) -> Result<Vec<AllowedEmail>, RepoError>;

    /// Insert or replace the entry for the email.
    async fn save(&self, entry: AllowedEmail) -> Result<AllowedEmail, RepoError>;
}
