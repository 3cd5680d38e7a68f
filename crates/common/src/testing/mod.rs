//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock implementations of common traits

pub mod mocks;

#[cfg(feature = "platform")]
pub use mocks::MockOAuthClient;
