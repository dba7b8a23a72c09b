//! Persistence: PostgreSQL via SeaORM, plus in-memory repositories.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

pub use memory::{
    InMemoryAllowedEmailRepository, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryProfileRepository,
};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresAllowedEmailRepository, PostgresCategoryRepository, PostgresPostRepository,
    PostgresProfileRepository,
};
