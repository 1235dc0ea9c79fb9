//! Retry with exponential backoff for flaky network collaborators (git fetch).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier (exponential)
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Conservative defaults for network operations
    pub fn conservative() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }

    /// `retries` extra attempts after the first one
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Self::conservative()
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::conservative()
    }
}

/// Boxed future returned by retryable operations
pub type RetryFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Run `f` until it succeeds or `config.max_attempts` is reached.
///
/// Each failure before the last is logged with `operation` as context.
pub async fn retry_with_backoff<'a, F, T, E>(
    config: &RetryConfig,
    operation: &str,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> RetryFuture<'a, T, E>,
    E: std::fmt::Display,
{
    let mut backoff = config.initial_backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= config.max_attempts {
                    return Err(e);
                }
                log::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    operation,
                    attempt,
                    config.max_attempts,
                    e,
                    backoff
                );
                sleep(backoff).await;
                backoff = Duration::from_secs_f64(
                    (backoff.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_backoff.as_secs_f64()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_success() {
        let attempt = Arc::new(AtomicU32::new(0));
        let config = fast(3);

        let attempt_clone = attempt.clone();
        let result = retry_with_backoff(&config, "fetch", || {
            let attempt_clone = attempt_clone.clone();
            Box::pin(async move {
                let curr = attempt_clone.fetch_add(1, Ordering::SeqCst) + 1;
                if curr < 3 {
                    Err("temporary error")
                } else {
                    Ok("success")
                }
            })
        })
        .await;

        assert_eq!(result, Ok("success"));
        assert_eq!(attempt.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_max_attempts() {
        let attempt = Arc::new(AtomicU32::new(0));
        let config = fast(2);

        let attempt_clone = attempt.clone();
        let result = retry_with_backoff(&config, "fetch", || {
            let attempt_clone = attempt_clone.clone();
            Box::pin(async move {
                attempt_clone.fetch_add(1, Ordering::SeqCst);
                Err::<&str, _>("always fails")
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempt.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_with_retries() {
        assert_eq!(RetryConfig::with_retries(0).max_attempts, 1);
        assert_eq!(RetryConfig::with_retries(2).max_attempts, 3);
    }
}
