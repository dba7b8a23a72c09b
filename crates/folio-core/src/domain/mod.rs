//! Domain entities - the blog's records and their rules.

mod category;
mod post;
mod profile;
pub mod rules;

pub use category::{Category, CategoryDraft, SortOrderUpdate, sort_for_display};
pub use post::{Post, PostDraft, PostFilter, PostPage};
pub use profile::{AllowedEmail, Profile, Role, admit_sign_in};
