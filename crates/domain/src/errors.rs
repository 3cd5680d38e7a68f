//! Error types used throughout the authentication flow

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse grouping of [`AuthError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCategory {
    /// The current login attempt is unusable (provider error, CSRF, code).
    LoginAttempt,
    /// Token acquisition or refresh failed.
    Token,
    /// The BFF or application API could not be reached or misbehaved.
    Backend,
    /// A guarded operation was attempted without a session.
    Session,
    /// Local configuration, storage, or invariant failure.
    Local,
}

/// Main error type for Passage
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum AuthError {
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Authorization code missing from callback")]
    MissingCode,

    #[error("Invalid or missing state parameter")]
    InvalidState,

    #[error("No code verifier stored for this login attempt")]
    MissingVerifier,

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Backend unavailable: {message}")]
    BackendUnavailable { message: String, retryable: bool },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session revocation failed: {0}")]
    RevocationFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Shorthand for a transient backend failure (network, 5xx).
    pub fn backend_transient(message: impl Into<String>) -> Self {
        Self::BackendUnavailable { message: message.into(), retryable: true }
    }

    /// Shorthand for a backend failure that retrying will not fix.
    pub fn backend_permanent(message: impl Into<String>) -> Self {
        Self::BackendUnavailable { message: message.into(), retryable: false }
    }

    /// Get the error category for this error
    pub fn category(&self) -> AuthErrorCategory {
        match self {
            Self::IdentityProvider(_) | Self::MissingCode | Self::InvalidState => {
                AuthErrorCategory::LoginAttempt
            }
            Self::MissingVerifier
            | Self::TokenExchangeFailed(_)
            | Self::NoRefreshToken
            | Self::RefreshFailed(_) => AuthErrorCategory::Token,
            Self::BackendUnavailable { .. } | Self::RevocationFailed(_) | Self::InvalidResponse(_) => {
                AuthErrorCategory::Backend
            }
            Self::Unauthenticated => AuthErrorCategory::Session,
            Self::Storage(_) | Self::Config(_) | Self::Internal(_) => AuthErrorCategory::Local,
        }
    }

    /// Check if this error may succeed when attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { retryable: true, .. })
    }

    /// Check if the user has to start a new login to recover
    pub fn requires_relogin(&self) -> bool {
        matches!(
            self.category(),
            AuthErrorCategory::LoginAttempt | AuthErrorCategory::Token | AuthErrorCategory::Session
        )
    }
}

/// Result type alias for Passage operations
pub type Result<T> = std::result::Result<T, AuthError>;
