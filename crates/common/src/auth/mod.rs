//! Core OAuth 2.0 + PKCE Infrastructure
//!
//! Client-side building blocks for the authorization code flow with PKCE.
//! Session orchestration (callback handling, login state) lives in
//! `passage-core`; this module only knows about the authorization server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  In-memory token slot + refresh
//! └────────┬────────┘
//!          │
//!          ├──► OAuthClientTrait   (authorize URL, code exchange, refresh)
//!          │         │
//!          │         └──► OAuthClient  (reqwest, RFC 6749 / RFC 7636)
//!          │
//!          ├──► claims             (unverified JWT payload, `exp` checks)
//!          └──► pkce               (verifier, challenge, CSRF state)
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: Core OAuth types (`TokenSet`, `OAuthConfig`, `OAuthError`)
//! - **[`pkce`]**: PKCE challenge generation and state validation
//! - **[`claims`]**: JWT payload decoding and expiry checks
//! - **[`client`]**: OAuth HTTP client for authorization and token exchange
//! - **[`token_manager`]**: Token lifecycle management with refresh
//!
//! # Security Features
//!
//! - **PKCE**: Prevents authorization code interception
//! - **State Validation**: CSRF protection with OS randomness and
//!   constant-time comparison
//! - **Memory-only tokens**: Nothing here writes tokens to disk
//! - **Redacted Debug**: Tokens, verifiers, and secrets never reach logs

pub mod claims;
pub mod client;
pub mod pkce;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use claims::{decode_claims, is_expired, ClaimsError, RegisteredClaims};
pub use client::{OAuthClient, OAuthClientError};
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, validate_state, PkceChallenge,
    PkceError,
};
pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::OAuthClientTrait;
pub use types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};
