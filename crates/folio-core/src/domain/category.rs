use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::rules::validate_slug;

/// Category entity - groups posts; `sort_order` defines listing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Sort order must not be negative"))]
    pub sort_order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a category.
///
/// A draft without `sort_order` is placed after every existing category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Sort order must not be negative"))]
    pub sort_order: Option<i32>,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
}

fn visible_by_default() -> bool {
    true
}

/// New position for one category in a bulk reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SortOrderUpdate {
    pub id: i64,
    #[validate(range(min = 0, message = "Sort order must not be negative"))]
    pub sort_order: i32,
}

impl Category {
    pub fn from_draft(id: i64, draft: CategoryDraft, sort_order: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            sort_order: draft.sort_order.unwrap_or(sort_order),
            is_visible: draft.is_visible,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, draft: CategoryDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.slug = draft.slug;
        self.description = draft.description;
        if let Some(order) = draft.sort_order {
            self.sort_order = order;
        }
        self.is_visible = draft.is_visible;
        self.updated_at = now;
    }
}

/// Sort categories into display order: `sort_order`, then id for ties.
pub fn sort_for_display(categories: &mut [Category]) {
    categories.sort_by_key(|c| (c.sort_order, c.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, slug: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            sort_order: None,
            is_visible: true,
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        let errors = draft("", "x").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let d: CategoryDraft = serde_json::from_str(r#"{"name":"Tech","slug":"tech"}"#).unwrap();
        assert!(d.is_visible);
        assert_eq!(d.sort_order, None);
    }

    #[test]
    fn test_from_draft_uses_fallback_order() {
        let c = Category::from_draft(3, draft("Tech", "tech"), 4, Utc::now());
        assert_eq!(c.sort_order, 4);

        let mut explicit = draft("Life", "life");
        explicit.sort_order = Some(0);
        let c = Category::from_draft(4, explicit, 9, Utc::now());
        assert_eq!(c.sort_order, 0);
    }

    #[test]
    fn test_sort_for_display() {
        let now = Utc::now();
        let mut list = vec![
            Category::from_draft(1, draft("B", "b"), 2, now),
            Category::from_draft(2, draft("A", "a"), 0, now),
            Category::from_draft(3, draft("C", "c"), 2, now),
        ];
        sort_for_display(&mut list);
        let ids: Vec<i64> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_negative_sort_order_rejected() {
        let update = SortOrderUpdate { id: 1, sort_order: -1 };
        assert!(update.validate().is_err());
    }
}
