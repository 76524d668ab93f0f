//! Retry with exponential backoff
//!
//! Retries an async operation while it fails with a retryable error and the
//! time budget has not run out.
//!
//! **Backoff Strategy:**
//! - Initial delay: 50ms
//! - Max delay: 1000ms
//! - Multiplier: 2.0 (exponential)

use std::time::{Duration, Instant};

const INITIAL_BACKOFF_MS: u64 = 50;
const MAX_BACKOFF_MS: u64 = 1000;

/// Retry `operation` until it succeeds, fails with a non-retryable error, or
/// `max_wait_ms` has elapsed. The last error is returned when giving up.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "tone scoring")
/// * `max_wait_ms` - Maximum total time to keep retrying; 0 disables retries
/// * `is_retryable` - Classifies an error as transient
/// * `operation` - Async closure performing one attempt
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    operation_name: &str,
    max_wait_ms: u64,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let start_time = Instant::now();
    let max_duration = Duration::from_millis(max_wait_ms);
    let mut attempt = 0u32;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }

                let elapsed = start_time.elapsed();
                if elapsed >= max_duration {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = elapsed.as_millis() as u64,
                        max_wait_ms,
                        error = %err,
                        "Giving up: retry budget exhausted"
                    );
                    return Err(err);
                }

                let sleep_ms = backoff_ms
                    .min(MAX_BACKOFF_MS)
                    .min(max_duration.saturating_sub(elapsed).as_millis() as u64)
                    .max(1);

                tracing::debug!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = sleep_ms,
                    error = %err,
                    "Transient failure, will retry after backoff"
                );

                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
            }
        }
    }
}
