//! Fixed-count retry for fallible async operations.
//!
//! Attempts run sequentially with no backoff; transient failures stay
//! invisible to callers unless every attempt fails.

use std::future::Future;

use tracing::warn;

/// All attempts failed. Carries the final attempt's error.
#[derive(Debug, thiserror::Error)]
#[error("operation failed after {attempts} attempts: {source}")]
pub struct ExhaustedRetries<E>
where
    E: std::error::Error + 'static,
{
    pub attempts: u32,
    #[source]
    pub source: E,
}

/// Run `operation` up to `max_retries + 1` times, returning the first
/// success or the last error once attempts are exhausted.
pub async fn run_with_retry<T, E, F, Fut>(
    operation: F,
    max_retries: u32,
) -> Result<T, ExhaustedRetries<E>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt > max_retries => {
                warn!(attempt, error = %err, "attempt failed, retries exhausted");
                return Err(ExhaustedRetries {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(err) => {
                warn!(attempt, error = %err, "attempt failed, retrying");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("boom {0}")]
    struct Boom(u32);

    #[tokio::test]
    async fn first_success_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run_with_retry(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Boom>(7)
                }
            },
            2,
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_on_later_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run_with_retry(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 { Err(Boom(n)) } else { Ok(n) }
                }
            },
            2,
        )
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_after_max_retries_plus_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = run_with_retry(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err::<(), _>(Boom(n))
                }
            },
            2,
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.source.0, 3, "carries the last error");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = run_with_retry(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Boom(1))
                }
            },
            0,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
