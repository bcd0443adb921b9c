//! Retry loop: run a closure until success or policy says stop.

use super::policy::{RetryDecision, RetryPolicy};
use crate::error::{CatalogError, Result};
use crate::interrupt::InterruptFlag;
use std::time::{Duration, Instant};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Runs `f` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt ceiling is reached.
///
/// Exhaustion is reported as `CatalogError::RetryExhausted` wrapping the last
/// failure. An interrupt, raised before an attempt, during backoff, or by the
/// operation itself, is returned as `CatalogError::Interrupted` right away.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, interrupt: &InterruptFlag, mut f: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 1u32;
    loop {
        if interrupt.is_raised() {
            return Err(CatalogError::Interrupted);
        }
        match f() {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if interrupt.is_raised() {
                    return Err(CatalogError::Interrupted);
                }
                if !e.is_retryable() {
                    return Err(e);
                }
                match policy.decide(attempt) {
                    RetryDecision::NoRetry => {
                        tracing::error!(error = %e, attempts = attempt, "retry attempts exhausted");
                        return Err(CatalogError::RetryExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            error = %e,
                            attempt,
                            max_attempts = policy.max_attempts,
                            delay_ms = d.as_millis() as u64,
                            "attempt failed, retrying"
                        );
                        sleep_unless_interrupted(d, interrupt)?;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

fn sleep_unless_interrupted(delay: Duration, interrupt: &InterruptFlag) -> Result<()> {
    let deadline = Instant::now() + delay;
    loop {
        if interrupt.is_raised() {
            return Err(CatalogError::Interrupted);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}
