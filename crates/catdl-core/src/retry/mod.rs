//! Retry and backoff policy.
//!
//! This module holds the attempt ceiling and exponential backoff decisions so
//! that the enumeration driver can wrap any step of the per-item pipeline
//! (existence check, resolve + download) in the same policy. Which failures
//! are worth retrying is decided by `CatalogError::is_retryable`.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
