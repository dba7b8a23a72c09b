use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::rules::{MAX_DESCRIPTION_LEN, validate_keywords, validate_slug};

/// Post entity - a blog article owned by the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub category_id: i64,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(max = MAX_DESCRIPTION_LEN, message = "Description may be at most 200 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_keywords"))]
    pub keywords: Option<Vec<String>>,
    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail_url: Option<String>,
    /// Serialized editor document, stored as-is.
    pub content: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a post. Updates overwrite every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[validate(range(min = 1, message = "Category is required"))]
    pub category_id: i64,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LEN, message = "Description may be at most 200 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_keywords"))]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl Post {
    /// Build a stored post from a draft, as the backing store would on insert.
    pub fn from_draft(id: i64, draft: PostDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            category_id: draft.category_id,
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            keywords: draft.keywords,
            thumbnail_url: draft.thumbnail_url,
            content: draft.content,
            is_published: draft.is_published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every writable field with the draft's values.
    pub fn apply(&mut self, draft: PostDraft, now: DateTime<Utc>) {
        self.category_id = draft.category_id;
        self.title = draft.title;
        self.slug = draft.slug;
        self.description = draft.description;
        self.keywords = draft.keywords;
        self.thumbnail_url = draft.thumbnail_url;
        self.content = draft.content;
        self.is_published = draft.is_published;
        self.updated_at = now;
    }
}

/// Filter for post listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<i64>,
    pub published_only: bool,
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            published_only: true,
            page: 1,
            page_size: 10,
        }
    }
}

impl PostFilter {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// One page of posts plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PostDraft {
        PostDraft {
            category_id: 1,
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            description: None,
            keywords: Some(vec!["rust".to_string()]),
            thumbnail_url: None,
            content: None,
            is_published: false,
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_six_keywords_rejected() {
        let mut d = draft();
        d.keywords = Some((0..6).map(|i| format!("kw{i}")).collect());
        let errors = d.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("keywords"));
    }

    #[test]
    fn test_bad_slug_and_long_description_rejected() {
        let mut d = draft();
        d.slug = "Not A Slug".to_string();
        d.description = Some("x".repeat(201));
        let errors = d.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn test_bad_thumbnail_rejected() {
        let mut d = draft();
        d.thumbnail_url = Some("not a url".to_string());
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_apply_overwrites_all_fields() {
        let created = Utc::now();
        let mut post = Post::from_draft(7, draft(), created);
        let mut next = draft();
        next.title = "Second".to_string();
        next.keywords = None;
        next.is_published = true;

        post.apply(next, created + chrono::TimeDelta::seconds(5));

        assert_eq!(post.id, 7);
        assert_eq!(post.title, "Second");
        assert_eq!(post.keywords, None);
        assert!(post.is_published);
        assert_eq!(post.created_at, created);
        assert!(post.updated_at > created);
    }

    #[test]
    fn test_filter_offset() {
        let filter = PostFilter {
            page: 3,
            page_size: 10,
            ..PostFilter::default()
        };
        assert_eq!(filter.offset(), 20);
    }
}
