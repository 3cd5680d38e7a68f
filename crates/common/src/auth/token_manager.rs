//! In-memory token store with refresh
//!
//! Manages the OAuth token lifecycle for the direct (public client) flow:
//! - Holds the current `TokenSet` in process memory only
//! - Reports expiry from the access token's own `exp` claim
//! - Refreshes through the OAuth client, keeping the prior refresh token when
//!   the server does not rotate it
//! - Drops every token when a refresh fails

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::client::OAuthClientError;
use super::traits::OAuthClientTrait;
use super::types::TokenSet;

/// Error type for token manager operations
#[derive(Debug, Error)]
pub enum TokenManagerError {
    /// OAuth operation failed
    #[error("OAuth error: {0}")]
    OAuthError(#[from] OAuthClientError),

    /// No tokens available (not authenticated)
    #[error("Not authenticated (no tokens)")]
    NotAuthenticated,

    /// Token refresh failed; tokens have been cleared
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// No refresh token available; tokens have been cleared
    #[error("No refresh token available")]
    NoRefreshToken,
}

/// Token manager with refresh capabilities
///
/// Cloning shares the same underlying token slot.
pub struct TokenManager<C: OAuthClientTrait + 'static> {
    oauth_client: Arc<C>,
    current_tokens: Arc<RwLock<Option<TokenSet>>>,
}

impl<C: OAuthClientTrait + 'static> Clone for TokenManager<C> {
    fn clone(&self) -> Self {
        Self {
            oauth_client: Arc::clone(&self.oauth_client),
            current_tokens: Arc::clone(&self.current_tokens),
        }
    }
}

impl<C: OAuthClientTrait + 'static> TokenManager<C> {
    /// Create a new token manager with no tokens
    #[must_use]
    pub fn new(oauth_client: Arc<C>) -> Self {
        Self { oauth_client, current_tokens: Arc::new(RwLock::new(None)) }
    }

    /// OAuth client used for refresh
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.oauth_client
    }

    /// Replace the current tokens (after a successful exchange or login)
    pub async fn store_tokens(&self, tokens: TokenSet) {
        *self.current_tokens.write().await = Some(tokens);
        debug!("Tokens stored");
    }

    /// Get current token set (without refresh)
    pub async fn get_tokens(&self) -> Option<TokenSet> {
        self.current_tokens.read().await.clone()
    }

    /// Current access token as-is, if any
    pub async fn access_token(&self) -> Option<String> {
        self.current_tokens.read().await.as_ref().map(|t| t.access_token.clone())
    }

    /// Check if an access token is held
    pub async fn is_authenticated(&self) -> bool {
        self.current_tokens.read().await.is_some()
    }

    /// Whether the held access token is expired at `now`
    ///
    /// No tokens counts as expired. A token without a decodable `exp` counts
    /// as valid and is left for the server to reject.
    pub async fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.current_tokens.read().await.as_ref() {
            Some(tokens) => tokens.is_expired_at(now),
            None => true,
        }
    }

    /// [`TokenManager::is_expired_at`] against the current time
    pub async fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now()).await
    }

    /// Refresh access token using the held refresh token
    ///
    /// On success the new set replaces the old one, inheriting the previous
    /// refresh token if the response carried none. On any failure all tokens
    /// are cleared.
    ///
    /// # Errors
    /// Returns `NoRefreshToken` when none is held and `RefreshFailed` when the
    /// server call fails
    pub async fn refresh_tokens(&self) -> Result<TokenSet, TokenManagerError> {
        let previous = self.current_tokens.read().await.as_ref().and_then(|t| t.refresh_token.clone());

        let Some(refresh_token) = previous else {
            warn!("Refresh requested without a refresh token; clearing tokens");
            self.clear_tokens().await;
            return Err(TokenManagerError::NoRefreshToken);
        };

        match self.oauth_client.refresh_access_token(&refresh_token).await {
            Ok(new_tokens) => {
                let tokens = new_tokens.inherit_refresh_token(Some(&refresh_token));
                self.store_tokens(tokens.clone()).await;
                info!("Successfully refreshed access token");
                Ok(tokens)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed; clearing tokens");
                self.clear_tokens().await;
                Err(TokenManagerError::RefreshFailed(e.to_string()))
            }
        }
    }

    /// Get a usable access token, refreshing first if the held one is expired
    ///
    /// # Errors
    /// Returns `NotAuthenticated` without tokens, otherwise the refresh errors
    pub async fn get_access_token(&self) -> Result<String, TokenManagerError> {
        if !self.is_authenticated().await {
            return Err(TokenManagerError::NotAuthenticated);
        }

        if self.is_expired().await {
            return self.refresh_tokens().await.map(|t| t.access_token);
        }

        self.access_token().await.ok_or(TokenManagerError::NotAuthenticated)
    }

    /// Clear all tokens (logout)
    pub async fn clear_tokens(&self) {
        *self.current_tokens.write().await = None;
        info!("Tokens cleared");
    }
}
