//! Shared building blocks for Passage crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: serde, error, and URL types (no runtime)
//! - `runtime`: async infrastructure (resilience)
//! - `platform`: authorization server integration (auth)
//! - `test-utils`: mocks for downstream test suites

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{OAuthClient, OAuthClientError, OAuthClientTrait, OAuthConfig, TokenManager, TokenSet};
#[cfg(feature = "runtime")]
pub use resilience::{
    policies, retry_with_policy, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
