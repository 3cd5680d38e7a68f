//! Resilience patterns for fault tolerance
//!
//! - **Retry Logic**: bounded retries with fixed, linear, exponential, or
//!   custom backoff and pluggable retry conditions
//!
//! Everything here is generic over the operation's error type and knows
//! nothing about authentication.

pub mod retry;

pub use retry::{
    policies, retry_with_policy, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
