//! Bounded retry with a fixed delay between attempts.

use crate::error::Result;
use std::future::Future;
use tokio::time::Duration;

/// Default delay between attempts when none is configured (seconds)
pub const DEFAULT_RETRY_DELAY_SECONDS: i64 = 5;

/// Default attempt budget when none is configured (single attempt)
pub const DEFAULT_MAX_ATTEMPTS: i64 = 0;

/// Retry behavior attached to a retryable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed wait between attempts. Zero or negative disables retrying.
    pub delay_seconds: i64,
    /// Total attempt budget. Zero or negative means a single attempt.
    pub max_attempts: i64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(delay_seconds: i64, max_attempts: i64) -> Self {
        Self {
            delay_seconds,
            max_attempts,
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::new(DEFAULT_RETRY_DELAY_SECONDS, 0)
    }

    /// The wait between attempts, or `None` when the delay cannot be waited on
    pub fn delay(&self) -> Option<Duration> {
        u64::try_from(self.delay_seconds)
            .ok()
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

/// Retry an async operation with a fixed delay
///
/// The operation runs once. On a recoverable failure with more than one attempt
/// left in the budget, waits `policy.delay_seconds` and runs it again. The last
/// failure is returned unchanged once the budget is spent.
///
/// A non-positive delay aborts at the wait step and returns the operation's
/// failure as-is. Non-recoverable errors (see
/// [`ReleaseError::is_recoverable`](crate::error::ReleaseError::is_recoverable))
/// are returned immediately.
pub async fn retry<F, T, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut remaining = policy.max_attempts;
    let mut attempt: i64 = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    log::info!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_recoverable() {
                    log::debug!("{} failed with unrecoverable error: {}", operation_name, e);
                    return Err(e);
                }

                if remaining <= 1 {
                    if attempt > 1 {
                        log::error!("{} failed after {} attempt(s): {}", operation_name, attempt, e);
                    }
                    return Err(e);
                }

                let Some(wait) = policy.delay() else {
                    log::warn!(
                        "{} failed and retry delay {}s is not positive; not retrying",
                        operation_name,
                        policy.delay_seconds
                    );
                    return Err(e);
                };

                log::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {}s...",
                    operation_name,
                    attempt,
                    policy.max_attempts,
                    e,
                    wait.as_secs()
                );

                tokio::time::sleep(wait).await;
                remaining -= 1;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, AssetError, ReleaseError};
    use std::cell::Cell;

    fn transient() -> ReleaseError {
        ReleaseError::Api(ApiError::Unknown {
            status: Some(503),
            message: "Service Unavailable".to_string(),
        })
    }

    /// Operation that fails `failures` times and then succeeds
    async fn flaky(calls: &Cell<u32>, failures: u32) -> Result<u32> {
        let n = calls.get() + 1;
        calls.set(n);
        if n <= failures { Err(transient()) } else { Ok(n) }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_when_budget_exceeds_failures() {
        for budget in 0..5i64 {
            for failures in 0..5u32 {
                let calls = Cell::new(0);
                let policy = RetryPolicy::new(1, budget);
                let result = retry(|| flaky(&calls, failures), &policy, "flaky").await;

                let expected_success = failures == 0 || budget > i64::from(failures);
                assert_eq!(
                    result.is_ok(),
                    expected_success,
                    "budget={budget} failures={failures}"
                );
                assert!(i64::from(calls.get()) <= budget.max(1));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error_unchanged() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(2, 3);
        let err = retry(|| flaky(&calls, 10), &policy, "always fails")
            .await
            .unwrap_err();

        assert_eq!(calls.get(), 3);
        assert!(matches!(
            err,
            ReleaseError::Api(ApiError::Unknown { status: Some(503), .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_delay_between_attempts() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(7, 3);
        let start = tokio::time::Instant::now();

        let result = retry(|| flaky(&calls, 2), &policy, "flaky").await;

        assert_eq!(result.unwrap(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(14), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(15), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_positive_delay_disables_retry() {
        for delay in [0, -3] {
            let calls = Cell::new(0);
            let policy = RetryPolicy::new(delay, 5);
            let err = retry(|| flaky(&calls, 1), &policy, "flaky").await.unwrap_err();

            assert_eq!(calls.get(), 1);
            assert!(matches!(err, ReleaseError::Api(_)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecoverable_error_is_not_retried() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(1, 5);
        let err = retry(
            || {
                calls.set(calls.get() + 1);
                async {
                    Err::<(), _>(ReleaseError::from(AssetError::DuplicateAsset {
                        name: "a.txt".to_string(),
                    }))
                }
            },
            &policy,
            "duplicate",
        )
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert!(matches!(
            err,
            ReleaseError::Asset(AssetError::DuplicateAsset { .. })
        ));
    }

    #[test]
    fn test_delay_conversion() {
        assert_eq!(RetryPolicy::new(5, 1).delay(), Some(Duration::from_secs(5)));
        assert_eq!(RetryPolicy::new(0, 1).delay(), None);
        assert_eq!(RetryPolicy::new(-1, 1).delay(), None);
    }
}
