//! # Passage Infrastructure
//!
//! Infrastructure implementations of core session ports.
//!
//! This crate contains:
//! - HTTP adapters for the application auth API, the BFF, and outgoing
//!   requests (reqwest)
//! - The pending-request store and the durable user cache
//! - An in-process `Location`
//! - Configuration loading, logging bootstrap, and runtime wiring
//!
//! ## Architecture
//! - Implements traits defined in `passage-core`
//! - Depends on `passage-common`, `passage-domain` and `passage-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod location;
pub mod logging;
pub mod runtime;
pub mod storage;

// Re-export commonly used items
pub use api::{AuthApiClient, ReqwestTransport};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use location::MemoryLocation;
pub use runtime::PassageRuntime;
pub use storage::{FileUserCache, InMemoryPendingStore, InMemoryUserCache};
