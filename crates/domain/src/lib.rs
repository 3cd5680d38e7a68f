//! # Passage Domain
//!
//! Authentication domain types and models for Passage.
//!
//! This crate contains:
//! - Session data types (`AuthSession`, `UserRecord`, `PendingAuthorization`)
//! - Redirect parameter parsing for the callback and landing routes
//! - Wire DTOs for the application auth API and the BFF
//! - The `AuthError` taxonomy and `Result` alias
//! - Configuration structures and endpoint constants
//!
//! ## Architecture
//! - No dependencies on other Passage crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
