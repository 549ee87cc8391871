//! Retry logic for the generation loop
//!
//! One pipeline invocation is expensive and slow, so the loop uses a fixed
//! inter-attempt delay rather than exponential backoff, and the pause is
//! raced against a cancellation token so a user interrupt ends the whole
//! operation instead of burning through the remaining attempts.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (a pipeline crash, a missing artifact, a commit that
/// did not complete) should return `true`. Permanent failures (bad
/// configuration, an unusable storage root, cancellation) should return
/// `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // One bad pipeline run says nothing about the next one
            Error::Pipeline(_) => true,
            // Silent non-production is retried the same as an explicit failure
            Error::NoArtifact => true,
            // A failed commit leaves no index entry, so the attempt can rerun
            Error::PartialWrite { .. } => true,
            // Config and storage-root problems need user action
            Error::Config { .. } => false,
            Error::StorageInit { .. } => false,
            // Terminal outcomes of the loop itself
            Error::ExhaustedRetries { .. } => false,
            Error::Cancelled => false,
            // Raw I/O and serialization failures outside a commit are permanent
            Error::Io(_) => false,
            Error::Serialization(_) => false,
        }
    }
}

/// Drive an async operation to success or exhaustion
///
/// Calls `operation` with the attempt number (starting at 1) up to
/// `config.max_attempts` times, sleeping `config.retry_delay` between
/// attempts. A `max_attempts` of zero is treated as one attempt.
///
/// # Returns
///
/// The first success, or:
/// - [`Error::ExhaustedRetries`] wrapping the last failure once every
///   attempt is spent,
/// - [`Error::Cancelled`] when `cancel` fires during an inter-attempt
///   pause,
/// - the error itself when it is not retryable.
pub async fn run_with_retry<F, Fut, T>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = config.retry_delay.as_millis(),
                    "Attempt failed, retrying"
                );

                tokio::select! {
                    () = cancel.cancelled() => {
                        tracing::info!("Cancelled while waiting to retry");
                        return Err(Error::Cancelled);
                    }
                    () = tokio::time::sleep(config.retry_delay) => {}
                }
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                tracing::error!(
                    error = %e,
                    attempts = max_attempts,
                    "Operation failed after all attempts exhausted"
                );
                return Err(Error::ExhaustedRetries {
                    attempts: max_attempts,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Operation failed with non-retryable error");
                return Err(e);
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            retry_delay: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_calls_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&fast_config(3), &CancellationToken::new(), |_attempt| {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn transient_failure_then_success_retries() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = run_with_retry(&fast_config(2), &CancellationToken::new(), |_attempt| {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::Pipeline("first run crashed".to_string()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhaustion_performs_exact_attempts_with_delays_between() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = std::time::Instant::now();

        let result: Result<()> =
            run_with_retry(&fast_config(3), &CancellationToken::new(), |_attempt| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::NoArtifact)
                }
            })
            .await;

        let elapsed = start.elapsed();
        assert_eq!(counter.load(Ordering::SeqCst), 3, "exactly 3 attempts");
        // 2 inter-attempt delays of 20ms each
        assert!(
            elapsed >= Duration::from_millis(40),
            "expected two delays, elapsed {elapsed:?}"
        );

        match result.unwrap_err() {
            Error::ExhaustedRetries { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, Error::NoArtifact));
            }
            other => panic!("expected ExhaustedRetries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn operation_receives_one_based_attempt_numbers() {
        let seen = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _result: Result<()> =
            run_with_retry(&fast_config(3), &CancellationToken::new(), |attempt| {
                let seen = seen_clone.clone();
                async move {
                    seen.lock().await.push(attempt);
                    Err(Error::Pipeline("always fails".to_string()))
                }
            })
            .await;

        assert_eq!(*seen.lock().await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> =
            run_with_retry(&fast_config(5), &CancellationToken::new(), |_attempt| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::Config {
                        message: "bad root".to_string(),
                        key: None,
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(Error::Config { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_during_pause_stops_the_loop() {
        let config = RetryConfig {
            max_attempts: 5,
            retry_delay: Duration::from_secs(30),
        };
        let cancel = CancellationToken::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let start = std::time::Instant::now();
        let result: Result<()> = run_with_retry(&config, &cancel, |_attempt| {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::Pipeline("always fails".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "no further attempts after cancellation"
        );
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "must not sit out the full 30s delay"
        );
    }

    #[tokio::test]
    async fn zero_max_attempts_still_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> =
            run_with_retry(&fast_config(0), &CancellationToken::new(), |_attempt| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Error::NoArtifact)
                }
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(Error::ExhaustedRetries { attempts: 1, .. })
        ));
    }

    #[test]
    fn transient_variants_are_retryable() {
        assert!(Error::Pipeline("crash".to_string()).is_retryable());
        assert!(Error::NoArtifact.is_retryable());
        assert!(
            Error::PartialWrite {
                path: "out.md".into(),
                reason: "disk full".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn permanent_variants_are_not_retryable() {
        assert!(
            !Error::Config {
                message: "bad".to_string(),
                key: None,
            }
            .is_retryable()
        );
        assert!(
            !Error::StorageInit {
                path: "/blogs".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }
            .is_retryable()
        );
        assert!(!Error::Cancelled.is_retryable());
        assert!(
            !Error::ExhaustedRetries {
                attempts: 2,
                last: Box::new(Error::NoArtifact),
            }
            .is_retryable()
        );
        assert!(
            !Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).is_retryable()
        );
    }
}
