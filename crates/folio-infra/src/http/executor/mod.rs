//! Concrete [`HttpExecutor`](folio_core::ports::HttpExecutor) implementations.

mod convert;
mod hooked;
mod native;

pub use hooked::{ExecutorHook, HookedExecutor, REQUEST_ID_HEADER, RequestIdHook, TracingHook};
pub use native::{CACHE_TAGS_HEADER, NativeExecutor, apply_cache_hints};
