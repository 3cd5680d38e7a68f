//! Application API adapters
//!
//! - [`AuthApiClient`]: the auth endpoints (`/api/auth/*`) for both variants
//! - [`ReqwestTransport`]: sends requests the session controller authorized

pub mod auth_api;
pub mod transport;

pub use auth_api::AuthApiClient;
pub use transport::ReqwestTransport;
