//! Caller-layered retry with exponential backoff and jitter.
//!
//! The executor sends each request exactly once. Callers that want retries
//! wrap an operation with [`retry_async`]; only errors whose kind reports
//! [`is_retryable`](crate::ErrorKind::is_retryable) are retried.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first failure.
    pub max_attempts: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff strategy to use.
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
        }
    }
}

impl RetryConfig {
    /// Set the max attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the max delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Disable retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    /// Constant delay between retries.
    Constant,
    /// Linear increase in delay (delay * attempt).
    Linear,
    /// Exponential increase in delay (delay * factor^attempt).
    Exponential { factor: f64 },
    /// Exponential with random jitter.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay(&self, attempt: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
        let delay = match self {
            BackoffStrategy::Constant => initial_delay,
            BackoffStrategy::Linear => initial_delay.saturating_mul(attempt + 1),
            BackoffStrategy::Exponential { factor } => {
                let multiplier = factor.powi(attempt as i32);
                secs_f64_capped(initial_delay.as_secs_f64() * multiplier, max_delay)
            }
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base_delay = initial_delay.as_secs_f64() * factor.powi(attempt as i32);

                // Jitter: random value between 0 and base_delay
                let jitter = rand::rng().random::<f64>() * base_delay;

                secs_f64_capped(base_delay + jitter, max_delay)
            }
        };

        std::cmp::min(delay, max_delay)
    }
}

fn secs_f64_capped(secs: f64, max_delay: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(max_delay)
}

/// Retry policy that tracks attempts for one operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Returns the number of retries taken so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if another retry is allowed.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Record an attempt and return the delay before the next retry.
    /// Returns None once all retries are used.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }

        let delay = self.config.backoff.delay(
            self.attempt,
            self.config.initial_delay,
            self.config.max_delay,
        );

        self.attempt += 1;
        Some(delay)
    }

    /// Reset the retry policy for a new operation.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// retries in `config` are used up.
///
/// Exhaustion yields [`ErrorKind::RetriesExhausted`] with the last error as
/// its source. With `max_attempts == 0` the first error is returned as is.
pub async fn retry_async<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut policy = RetryPolicy::new(config.clone());

    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => err,
            Err(err) => return Err(err),
        };

        if config.max_attempts == 0 {
            return Err(err);
        }

        match policy.next_delay() {
            Some(delay) => {
                warn!(
                    attempt = policy.attempt(),
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            None => {
                return Err(Error::with_source(
                    ErrorKind::RetriesExhausted {
                        attempts: policy.attempt() + 1,
                    },
                    err,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::new(RetryConfig::no_retry());
        assert!(!policy.should_retry());
    }

    #[test]
    fn test_constant_and_linear_backoff() {
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        assert_eq!(BackoffStrategy::Constant.delay(5, initial, max), initial);
        assert_eq!(
            BackoffStrategy::Linear.delay(2, initial, max),
            Duration::from_secs(3)
        );
        assert_eq!(BackoffStrategy::Linear.delay(100, initial, max), max);
    }

    #[test]
    fn test_exponential_backoff() {
        let strategy = BackoffStrategy::Exponential { factor: 2.0 };
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        assert_eq!(strategy.delay(0, initial, max), Duration::from_secs(1));
        assert_eq!(strategy.delay(1, initial, max), Duration::from_secs(2));
        assert_eq!(strategy.delay(3, initial, max), Duration::from_secs(8));
        assert_eq!(strategy.delay(10, initial, max), max);
        assert_eq!(strategy.delay(5000, initial, max), max);
    }

    #[test]
    fn test_exponential_with_jitter() {
        let strategy = BackoffStrategy::ExponentialWithJitter { factor: 2.0 };
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        let delay = strategy.delay(1, initial, max);
        assert!(delay >= Duration::from_secs(2));
        assert!(delay <= Duration::from_secs(4));
    }

    #[test]
    fn test_retry_policy() {
        let mut policy = RetryPolicy::new(RetryConfig::default().with_max_attempts(2));

        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert_eq!(policy.attempt(), 2);
        assert!(policy.next_delay().is_none());

        policy.reset();
        assert!(policy.should_retry());
    }

    fn fast(attempts: u32) -> RetryConfig {
        RetryConfig::default()
            .with_max_attempts(attempts)
            .with_initial_delay(Duration::from_millis(1))
            .with_backoff(BackoffStrategy::Constant)
    }

    #[tokio::test]
    async fn test_retry_async_recovers() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = retry_async(&fast(3), move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::new(ErrorKind::InternalServer))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_async_exhausted_keeps_last_error() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = retry_async(&fast(2), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::new(ErrorKind::Connection("reset".into())))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 3 }));
        let source = err.source.as_ref().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("reset"));
    }

    #[tokio::test]
    async fn test_retry_async_stops_on_fatal_error() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = retry_async(&fast(5), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::new(ErrorKind::Configuration("unsignable".into())))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err.kind, ErrorKind::Configuration(_)));
    }

    #[tokio::test]
    async fn test_retry_async_without_retries_returns_error() {
        let err = retry_async(&RetryConfig::no_retry(), || async {
            Err::<(), _>(Error::new(ErrorKind::InternalServer))
        })
        .await
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InternalServer));
    }
}
