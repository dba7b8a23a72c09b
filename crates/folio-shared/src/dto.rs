//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use folio_core::domain::{Profile, Role};

/// Largest page size a listing will serve.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Query parameters for `GET /api/posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 50))]
    pub page_size: Option<u64>,
    /// Category slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_unpublished: Option<bool>,
}

impl PostListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(10).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Query parameters for `GET /api/categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_visible: Option<bool>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        Self {
            items,
            page,
            page_size,
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

impl<T: Validate> Validate for Page<T> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_each(&self.items)
    }
}

/// Request to exchange a Google ID token for a session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "ID token is required"))]
    pub id_token: String,
}

/// Response containing a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub profile: Profile,
}

/// Request to add an email to the allow-list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    pub role: Role,
    #[serde(default = "login_allowed_by_default")]
    pub is_login_allowed: bool,
}

fn login_allowed_by_default() -> bool {
    true
}

/// Validate every item, reporting the first failure.
pub fn validate_each<T: Validate>(items: &[T]) -> Result<(), ValidationErrors> {
    items.iter().try_for_each(|item| item.validate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::SortOrderUpdate;

    #[test]
    fn test_page_math() {
        let page = Page {
            items: vec![1, 2, 3],
            page: 1,
            page_size: 3,
            total: 7,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
    }

    #[test]
    fn test_list_query_defaults_and_clamp() {
        let q = PostListQuery::default();
        assert_eq!((q.page(), q.page_size()), (1, 10));

        let q = PostListQuery {
            page_size: Some(500),
            ..PostListQuery::default()
        };
        assert_eq!(q.page_size(), MAX_PAGE_SIZE);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_validate_each_reports_failure() {
        let items = vec![
            SortOrderUpdate { id: 1, sort_order: 0 },
            SortOrderUpdate { id: 2, sort_order: -3 },
        ];
        assert!(validate_each(&items).is_err());
        assert!(validate_each(&items[..1]).is_ok());
    }

    #[test]
    fn test_invite_requires_email() {
        let invite = InviteRequest {
            email: "not-an-email".to_string(),
            role: Role::Editor,
            is_login_allowed: true,
        };
        assert!(invite.validate().is_err());
    }
}
