//! Observability module - correlation ids for requests and envelopes.

mod request_id;

pub use request_id::{Correlation, CorrelationMiddleware, envelope};
