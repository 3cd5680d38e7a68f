//! Login strategies and their ports
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │  AuthStrategy    │
//!                  └────────┬─────────┘
//!             ┌─────────────┴─────────────┐
//!   ┌─────────▼─────────┐       ┌─────────▼─────────┐
//!   │  DirectStrategy   │       │   BffStrategy     │
//!   │  PKCE + tokens    │       │  cookie session   │
//!   └─────────┬─────────┘       └─────────┬─────────┘
//!             │ TokenManager              │ status polling
//!             ▼                           ▼
//!   authorization server          BFF /api/auth/*
//! ```

pub mod bff;
pub mod direct;
pub mod ports;
pub mod strategy;

pub use bff::BffStrategy;
pub use direct::DirectStrategy;
pub use ports::{AuthApi, Location, PendingRequestStore, RequestTransport, UserCache};
pub use strategy::AuthStrategy;
