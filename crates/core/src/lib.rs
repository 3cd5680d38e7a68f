//! # Passage Core
//!
//! Session logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Login strategies for the direct PKCE and BFF variants
//! - The callback state machine
//! - The session controller that owns the authentication state
//! - Port interfaces (traits) for storage, HTTP, and navigation
//!
//! ## Architecture Principles
//! - Only depends on `passage-common` and `passage-domain`
//! - No HTTP clients, files, or browser APIs
//! - All external dependencies via traits

pub mod auth;
pub mod callback;
pub mod session;

pub use auth::ports::{AuthApi, Location, PendingRequestStore, RequestTransport, UserCache};
pub use auth::{AuthStrategy, BffStrategy, DirectStrategy};
pub use callback::{CallbackHandler, CallbackOutcome, CallbackState};
pub use session::SessionController;
