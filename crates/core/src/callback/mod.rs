//! Callback route handling
//!
//! Turns the redirect back from the identity provider (or the BFF) into a
//! signed-in session, publishing progress as a [`CallbackState`].

pub mod handler;

pub use handler::{CallbackHandler, CallbackOutcome, CallbackState};
