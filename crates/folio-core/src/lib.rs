//! # Folio Core
//!
//! The domain layer of the Folio blog.
//! This crate contains the blog's records, their validation rules, and the
//! ports (traits) that infrastructure implements. It performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
