//! Retry loop with linear backoff
//!
//! The attempt budget and backoff unit come from the client configuration;
//! the sleep before attempt n+1 is `delay * n`. Whether an error may be
//! retried at all is decided by the classifier, not here.

use std::time::Duration;
use crate::error::{Error, Result};

/// Attempt budget and backoff unit for one request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Linear backoff unit
    pub delay: Duration,
}

impl RetryPolicy {
    /// Sleep duration after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay * attempt
    }
}

/// Run `op` up to `policy.max_attempts` times.
///
/// `op` receives the 1-based attempt number. After a retryable failure
/// with attempts remaining, `on_retry(attempt, error, delay)` is invoked
/// and the loop sleeps `delay` before the next attempt. Non-retryable
/// failures and budget exhaustion return the last error unchanged.
pub async fn execute_with_retry<T, F, Fut, H>(
    policy: &RetryPolicy,
    mut op: F,
    mut on_retry: H,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
    H: FnMut(u32, &Error, Duration),
{
    let mut attempt: u32 = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if error.is_retryable() && attempt < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    on_retry(attempt, &error, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                } else {
                    return Err(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn api_error(retryable: bool) -> Error {
        Error::Api {
            kind: if retryable {
                ErrorKind::ServerError
            } else {
                ErrorKind::InvalidRequest
            },
            message: "boom".to_string(),
            endpoint: "/test".to_string(),
            http_status: Some(if retryable { 500 } else { 400 }),
            provider_code: None,
            retryable,
        }
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1_000),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn test_non_retryable_makes_exactly_one_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(10),
        };
        let mut attempts = 0u32;
        let result: Result<()> = execute_with_retry(
            &policy,
            |_| {
                attempts += 1;
                async { Err(api_error(false)) }
            },
            |_, _, _| panic!("non-retryable errors must not trigger on_retry"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_retryable_then_success_makes_two_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(10),
        };
        let mut attempts = 0u32;
        let mut retries = 0u32;
        let result = execute_with_retry(
            &policy,
            |attempt| {
                attempts += 1;
                async move {
                    if attempt == 1 {
                        Err(api_error(true))
                    } else {
                        Ok("payload")
                    }
                }
            },
            |_, _, _| retries += 1,
        )
        .await;

        assert_eq!(result.unwrap(), "payload");
        assert_eq!(attempts, 2);
        assert_eq!(retries, 1);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(5),
        };
        let mut attempts = 0u32;
        let result: Result<()> = execute_with_retry(
            &policy,
            |_| {
                attempts += 1;
                async { Err(api_error(true)) }
            },
            |_, _, _| {},
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 3);
    }

    // The end-to-end backoff scenario: two server errors then success with
    // the default delay unit must wait at least 1000 + 2000 ms. Runs on a
    // paused clock so the assertion is exact without real sleeping; the
    // tokio Instant tracks the virtual clock.
    #[tokio::test(start_paused = true)]
    async fn test_backoff_elapsed_for_two_retries() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1_000),
        };
        let start = tokio::time::Instant::now();
        let result = execute_with_retry(
            &policy,
            |attempt| async move {
                if attempt < 3 {
                    Err(api_error(true))
                } else {
                    Ok(attempt)
                }
            },
            |_, _, _| {},
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert!(start.elapsed() >= Duration::from_millis(3_000));
    }
}
