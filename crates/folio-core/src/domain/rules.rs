//! Field rules shared by posts and categories.

use std::borrow::Cow;

use validator::ValidationError;

/// Maximum number of keywords on a post.
pub const MAX_KEYWORDS: usize = 5;

/// Maximum length of a single keyword, in characters.
pub const MAX_KEYWORD_LEN: usize = 32;

/// Maximum length of a post description, in characters.
pub const MAX_DESCRIPTION_LEN: u64 = 200;

/// Returns true when `slug` matches `^[a-z0-9-]+$`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        return Ok(());
    }
    let mut err = ValidationError::new("slug");
    err.message = Some(Cow::Borrowed(
        "Slug may only contain lowercase letters, digits and hyphens",
    ));
    Err(err)
}

pub fn validate_keywords(keywords: &[String]) -> Result<(), ValidationError> {
    if keywords.len() > MAX_KEYWORDS {
        let mut err = ValidationError::new("keywords_count");
        err.message = Some(Cow::Borrowed("At most 5 keywords are allowed"));
        return Err(err);
    }
    if let Some(too_long) = keywords
        .iter()
        .find(|k| k.chars().count() > MAX_KEYWORD_LEN)
    {
        let mut err = ValidationError::new("keyword_length");
        err.message = Some(Cow::Borrowed("Keywords may be at most 32 characters"));
        err.add_param(Cow::Borrowed("value"), too_long);
        return Err(err);
    }
    Ok(())
}

/// Lowercases and trims an email address for allow-list lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
