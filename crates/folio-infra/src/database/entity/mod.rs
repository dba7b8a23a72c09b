//! SeaORM entities mirroring the backend's tables.

pub mod allowed_email;
pub mod category;
pub mod post;
pub mod profile;
