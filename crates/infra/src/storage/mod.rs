//! Storage adapters
//!
//! - [`InMemoryPendingStore`]: the in-flight login attempt, never persisted
//! - [`FileUserCache`] / [`InMemoryUserCache`]: the pre-render user copy

pub mod pending;
pub mod user_cache;

pub use pending::InMemoryPendingStore;
pub use user_cache::{FileUserCache, InMemoryUserCache};
