//! Traits for OAuth operations
//!
//! Abstracts the authorization server so token management and the login
//! strategies can be exercised against mocks.

use async_trait::async_trait;
use url::Url;

use super::client::OAuthClientError;
use super::pkce::PkceChallenge;
use super::types::TokenSet;

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build the authorization URL for a prepared PKCE challenge
    fn authorization_url(&self, challenge: &PkceChallenge) -> Url;

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the token exchange fails or the response cannot be
    /// parsed
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError>;

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if refresh fails or token is invalid/revoked
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<TokenSet, OAuthClientError>;

    /// Get the configured redirect URI
    fn redirect_uri(&self) -> &str;
}
