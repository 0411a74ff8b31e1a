// ABOUTME: Bounded retry of idempotent control-plane reads.
// ABOUTME: Exponential backoff inside a fixed deadline; writes never pass through here.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::diagnostics::{Diagnostics, Warning};
use crate::plane::{DescribeServiceError, PlaneError};

/// Errors that say whether the same read may succeed if repeated.
pub trait Transient: Display {
    fn is_transient(&self) -> bool;
}

impl Transient for PlaneError {
    fn is_transient(&self) -> bool {
        PlaneError::is_transient(self)
    }
}

impl Transient for DescribeServiceError {
    fn is_transient(&self) -> bool {
        DescribeServiceError::is_transient(self)
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// Doubles from `initial` and never exceeds the larger of `initial` and `max`.
pub fn backoff_delay(initial: Duration, attempt: u32, max: Duration) -> Duration {
    let cap = max.max(initial);
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    initial.saturating_mul(factor).min(cap)
}

/// When and how often a read may be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub deadline: Instant,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(budget: Duration, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
            initial_backoff,
            max_backoff,
        }
    }
}

/// Run `call` until it succeeds, fails permanently, or the deadline passes.
///
/// Each retried failure is recorded in `diag`. The last error is returned
/// once the deadline leaves no time for another attempt.
pub async fn retry_read<T, E, F, Fut>(
    policy: &RetryPolicy,
    diag: &mut Diagnostics,
    mut call: F,
) -> Result<T, E>
where
    E: Transient,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => err,
            Err(err) => return Err(err),
        };

        let remaining = policy.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(err);
        }

        attempt = attempt.saturating_add(1);
        let wait = backoff_delay(policy.initial_backoff, attempt, policy.max_backoff).min(remaining);
        diag.warn(Warning::retried_read(format!(
            "{err}; retrying in {:.1}s",
            wait.as_secs_f64()
        )));
        tokio::time::sleep(wait).await;
    }
}
