//! In-memory repositories, used when no database is configured and in tests.
//! Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{
    AllowedEmail, Category, CategoryDraft, Post, PostDraft, PostFilter, PostPage, Profile,
    SortOrderUpdate, sort_for_display,
};
use folio_core::error::RepoError;
use folio_core::ports::{
    AllowedEmailRepository, BaseRepository, CategoryRepository, PostRepository,
    ProfileRepository,
};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn slug_taken(slug: &str) -> RepoError {
    RepoError::Constraint(format!("slug '{slug}' already exists"))
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| p.slug == slug).cloned())
    }

    async fn list(&self, filter: &PostFilter) -> Result<PostPage, RepoError> {
        let table = self.table.read().await;
        let mut matches: Vec<&Post> = table
            .rows
            .values()
            .filter(|p| !filter.published_only || p.is_published)
            .filter(|p| filter.category_id.is_none_or(|c| p.category_id == c))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .cloned()
            .collect();
        Ok(PostPage { items, total })
    }

    async fn create(&self, draft: PostDraft) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|p| p.slug == draft.slug) {
            return Err(slug_taken(&draft.slug));
        }
        let id = table.allocate_id();
        let post = Post::from_draft(id, draft, Utc::now());
        table.rows.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|p| p.slug == draft.slug && p.id != id)
        {
            return Err(slug_taken(&draft.slug));
        }
        let post = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply(draft, Utc::now());
        Ok(post.clone())
    }

    async fn count_in_category(&self, category_id: i64) -> Result<u64, RepoError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    table: RwLock<Table<Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Category, i64> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self, only_visible: bool) -> Result<Vec<Category>, RepoError> {
        let table = self.table.read().await;
        let mut categories: Vec<Category> = table
            .rows
            .values()
            .filter(|c| !only_visible || c.is_visible)
            .cloned()
            .collect();
        sort_for_display(&mut categories);
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|c| c.slug == slug).cloned())
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|c| c.slug == draft.slug) {
            return Err(slug_taken(&draft.slug));
        }
        let next_order = table
            .rows
            .values()
            .map(|c| c.sort_order + 1)
            .max()
            .unwrap_or(0);
        let id = table.allocate_id();
        let category = Category::from_draft(id, draft, next_order, Utc::now());
        table.rows.insert(id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, draft: CategoryDraft) -> Result<Category, RepoError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|c| c.slug == draft.slug && c.id != id)
        {
            return Err(slug_taken(&draft.slug));
        }
        let category = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        category.apply(draft, Utc::now());
        Ok(category.clone())
    }

    async fn reorder(&self, updates: &[SortOrderUpdate]) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        if updates.iter().any(|u| !table.rows.contains_key(&u.id)) {
            return Err(RepoError::NotFound);
        }
        let now = Utc::now();
        for update in updates {
            if let Some(category) = table.rows.get_mut(&update.id) {
                category.sort_order = update.sort_order;
                category.updated_at = now;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    rows: RwLock<HashMap<Uuid, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Profile, Uuid> for InMemoryProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, RepoError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|p| p.email == email).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.values_mut().find(|p| p.email == profile.email) {
            existing.name = profile.name;
            existing.role = profile.role;
            existing.updated_at = profile.updated_at;
            return Ok(existing.clone());
        }
        rows.insert(profile.id, profile.clone());
        Ok(profile)
    }
}

#[derive(Default)]
pub struct InMemoryAllowedEmailRepository {
    rows: RwLock<BTreeMap<String, AllowedEmail>>,
}

impl InMemoryAllowedEmailRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<AllowedEmail, String> for InMemoryAllowedEmailRepository {
    async fn find_by_id(&self, email: String) -> Result<Option<AllowedEmail>, RepoError> {
        Ok(self.rows.read().await.get(&email).cloned())
    }

    async fn delete(&self, email: String) -> Result<(), RepoError> {
        self.rows
            .write()
            .await
            .remove(&email)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl AllowedEmailRepository for InMemoryAllowedEmailRepository {
    async fn list(&self) -> Result<Vec<AllowedEmail>, RepoError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn save(&self, mut entry: AllowedEmail) -> Result<AllowedEmail, RepoError> {
        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.get(&entry.email) {
            entry.created_at = existing.created_at;
        }
        rows.insert(entry.email.clone(), entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::Role;

    fn post_draft(slug: &str, category_id: i64, published: bool) -> PostDraft {
        PostDraft {
            category_id,
            title: format!("Title {slug}"),
            slug: slug.to_string(),
            description: None,
            keywords: None,
            thumbnail_url: None,
            content: None,
            is_published: published,
        }
    }

    fn category_draft(slug: &str) -> CategoryDraft {
        CategoryDraft {
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            description: None,
            sort_order: None,
            is_visible: true,
        }
    }

    #[tokio::test]
    async fn test_post_listing_hides_drafts_and_paginates() {
        let repo = InMemoryPostRepository::new();
        for i in 0..5 {
            repo.create(post_draft(&format!("p{i}"), 1, true))
                .await
                .unwrap();
        }
        repo.create(post_draft("draft", 1, false)).await.unwrap();

        let page = repo
            .list(&PostFilter {
                page: 2,
                page_size: 2,
                ..PostFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        // Newest first.
        assert_eq!(page.items[0].slug, "p2");

        let all = repo
            .list(&PostFilter {
                published_only: false,
                page_size: 50,
                ..PostFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(all.total, 6);
    }

    #[tokio::test]
    async fn test_post_slug_unique() {
        let repo = InMemoryPostRepository::new();
        let first = repo.create(post_draft("hello", 1, true)).await.unwrap();
        let second = repo.create(post_draft("world", 1, true)).await.unwrap();

        assert!(matches!(
            repo.create(post_draft("hello", 1, true)).await,
            Err(RepoError::Constraint(_))
        ));
        assert!(matches!(
            repo.update(second.id, post_draft("hello", 1, true)).await,
            Err(RepoError::Constraint(_))
        ));
        // Keeping one's own slug is fine.
        assert!(repo.update(first.id, post_draft("hello", 2, false)).await.is_ok());
        assert_eq!(repo.count_in_category(2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_category_order_and_reorder() {
        let repo = InMemoryCategoryRepository::new();
        let a = repo.create(category_draft("a")).await.unwrap();
        let b = repo.create(category_draft("b")).await.unwrap();
        assert_eq!((a.sort_order, b.sort_order), (0, 1));

        repo.reorder(&[
            SortOrderUpdate { id: a.id, sort_order: 1 },
            SortOrderUpdate { id: b.id, sort_order: 0 },
        ])
        .await
        .unwrap();
        let slugs: Vec<String> = repo
            .list(false)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.slug)
            .collect();
        assert_eq!(slugs, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_reorder_is_all_or_nothing() {
        let repo = InMemoryCategoryRepository::new();
        let a = repo.create(category_draft("a")).await.unwrap();

        let result = repo
            .reorder(&[
                SortOrderUpdate { id: a.id, sort_order: 9 },
                SortOrderUpdate { id: 404, sort_order: 0 },
            ])
            .await;
        assert!(matches!(result, Err(RepoError::NotFound)));
        assert_eq!(repo.find_by_id(a.id).await.unwrap().unwrap().sort_order, 0);
    }

    #[tokio::test]
    async fn test_profile_upsert_keeps_id() {
        let repo = InMemoryProfileRepository::new();
        let first = repo
            .upsert(Profile::new("w@example.com", "W".to_string(), Role::Editor))
            .await
            .unwrap();
        let second = repo
            .upsert(Profile::new("w@example.com", "Writer".to_string(), Role::Master))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Writer");
        assert_eq!(second.role, Role::Master);
    }

    #[tokio::test]
    async fn test_allowed_email_save_and_delete() {
        let repo = InMemoryAllowedEmailRepository::new();
        repo.save(AllowedEmail::invite("a@example.com", Role::Editor, None))
            .await
            .unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);

        repo.delete("a@example.com".to_string()).await.unwrap();
        assert!(matches!(
            repo.delete("a@example.com".to_string()).await,
            Err(RepoError::NotFound)
        ));
    }
}
