//! Bounded retry with pluggable backoff and retry conditions
//!
//! Used wherever an operation may legitimately fail a few times before it
//! succeeds, such as polling a backend that has not yet observed a freshly
//! established session. Delays go through `tokio::time`, so tests running
//! under a paused clock complete instantly.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted; carries the final error
    #[error("All retry attempts exhausted after {attempts} tries: {last}")]
    AttemptsExhausted { attempts: u32, last: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {error}")]
    NonRetryable { error: E },

    /// The retry strategy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// The operation's own error, if the failure came from the operation
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { last, .. } => Some(last),
            Self::NonRetryable { error } => Some(error),
            Self::InvalidConfiguration { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    pub total_delay: Duration,
    pub started_at: Instant,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    /// Total elapsed time from first attempt to now
    pub fn total_elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a custom
    /// delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone)]
#[allow(unpredictable_function_pointer_comparisons)]
#[derive(PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: initial_delay + (attempt * increment)
    Linear { initial_delay: Duration, increment: Duration },
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
    /// Custom backoff function
    Custom(fn(u32) -> Duration),
}

impl BackoffStrategy {
    /// Calculate the delay after the given zero-based attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Linear { initial_delay, increment } => {
                *initial_delay + increment.saturating_mul(attempt)
            }
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_secs_f64() * base.powi(exponent);
                Duration::from_secs_f64(delay.min(max_delay.as_secs_f64()))
            }
            BackoffStrategy::Custom(f) => f(attempt),
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Fixed-delay configuration, the shape used for status polling
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, backoff: BackoffStrategy::Fixed(delay) }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn linear_backoff(mut self, initial_delay: Duration, increment: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Linear { initial_delay, increment };
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started_at = Instant::now();
        let max_attempts = self.config.max_attempts.max(1);
        let mut total_delay = Duration::ZERO;
        let mut attempt = 0u32;

        loop {
            let attempt_number = attempt + 1;
            debug!("Executing operation (attempt {}/{})", attempt_number, max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt_number,
                        total_delay,
                        started_at,
                    };
                }
                Err(error) => error,
            };

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!(error = %error, "Retry policy determined not to retry");
                    return RetryOutcome {
                        result: Err(RetryError::NonRetryable { error }),
                        attempts: attempt_number,
                        total_delay,
                        started_at,
                    };
                }
                RetryDecision::Retry => self.config.backoff.calculate_delay(attempt),
                RetryDecision::RetryAfter(custom) => custom,
            };

            if attempt_number >= max_attempts {
                warn!(
                    "All retry attempts exhausted after {} tries, last error: {}",
                    attempt_number, error
                );
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted {
                        attempts: attempt_number,
                        last: error,
                    }),
                    attempts: attempt_number,
                    total_delay,
                    started_at,
                };
            }

            warn!("Operation failed (attempt {}), retrying after {:?}", attempt_number, delay);
            tokio::time::sleep(delay).await;
            total_delay += delay;
            attempt += 1;
        }
    }
}

/// Convenience function to create a retry executor and execute an operation
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: RetryConfig,
    policy: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Display,
{
    RetryExecutor::new(config, policy).execute(operation).await
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone, Copy)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
