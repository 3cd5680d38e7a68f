//! OAuth 2.0 client implementation with PKCE support
//!
//! Talks to the authorization server's two endpoints:
//! - Authorization URL building (`/oauth2/authorize`)
//! - Authorization code exchange and token refresh (`/oauth2/token`)
//!
//! The client is stateless: the PKCE verifier and CSRF state are owned by the
//! caller's pending-request store, not by this type.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use super::pkce::{PkceChallenge, PkceError};
use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};

/// Default timeout for token endpoint calls
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token endpoint answered with an RFC 6749 error body
    #[error("OAuth error: {0}")]
    OAuthError(OAuthError),

    /// Token endpoint answered with a non-success status and no error body
    #[error("token endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Failed to parse response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// PKCE challenge generation failed
    #[error("PKCE generation error: {0}")]
    PkceError(#[from] PkceError),
}

/// OAuth 2.0 client with PKCE support
///
/// Implements RFC 6749 (OAuth 2.0) and RFC 7636 (PKCE) for public and
/// confidential clients.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client cannot be built
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthClientError> {
        let http = Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| OAuthClientError::ConfigError(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Create a client that shares an existing `reqwest::Client`
    #[must_use]
    pub fn with_http_client(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// Build the browser authorization URL for a prepared challenge
    ///
    /// # Examples
    /// ```
    /// use passage_common::auth::{OAuthClient, OAuthConfig, PkceChallenge};
    ///
    /// let config = OAuthConfig {
    ///     authorization_endpoint: "http://localhost:9090/oauth2/authorize".parse().unwrap(),
    ///     token_endpoint: "http://localhost:9090/oauth2/token".parse().unwrap(),
    ///     client_id: "frontend-client".to_string(),
    ///     client_secret: None,
    ///     redirect_uri: "http://localhost:3000/callback".to_string(),
    ///     scopes: vec!["openid".to_string()],
    /// };
    /// let client = OAuthClient::new(config).unwrap();
    /// let challenge = PkceChallenge::generate().unwrap();
    /// let url = client.authorization_url(&challenge);
    /// assert!(url.as_str().contains("code_challenge_method=S256"));
    /// ```
    #[must_use]
    pub fn authorization_url(&self, challenge: &PkceChallenge) -> Url {
        let mut url = self.config.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope_string())
            .append_pair("state", &challenge.state)
            .append_pair("code_challenge", &challenge.code_challenge)
            .append_pair("code_challenge_method", challenge.challenge_method());
        url
    }

    /// Exchange an authorization code for tokens
    ///
    /// State validation is the caller's job; by the time this runs the state
    /// has already been consumed and matched.
    ///
    /// # Errors
    /// Returns error if the request fails, the server rejects the code, or the
    /// response cannot be parsed
    #[instrument(skip_all, fields(endpoint = %self.config.token_endpoint))]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        let form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self.token_request(form).send().await?;
        let tokens = Self::parse_token_response(response).await?;
        debug!(has_refresh = tokens.refresh_token.is_some(), "authorization code exchanged");
        Ok(tokens)
    }

    /// Refresh access token using refresh token
    ///
    /// The returned set carries whatever the server sent; keeping the previous
    /// refresh token when none is returned is up to the caller.
    ///
    /// # Errors
    /// Returns `NoRefreshToken` for an empty token, otherwise the same errors
    /// as [`OAuthClient::exchange_code`]
    #[instrument(skip_all, fields(endpoint = %self.config.token_endpoint))]
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let form = vec![("grant_type", "refresh_token"), ("refresh_token", refresh_token)];
        let response = self.token_request(form).send().await?;
        Self::parse_token_response(response).await
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn token_request<'a>(&'a self, mut form: Vec<(&'a str, &'a str)>) -> RequestBuilder {
        let request = self.http.post(self.config.token_endpoint.clone());
        match &self.config.client_secret {
            Some(secret) => request.basic_auth(&self.config.client_id, Some(secret)).form(&form),
            None => {
                form.push(("client_id", self.config.client_id.as_str()));
                request.form(&form)
            }
        }
    }

    async fn parse_token_response(response: Response) -> Result<TokenSet, OAuthClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "token endpoint rejected request");
            return Err(match serde_json::from_str::<OAuthError>(&body) {
                Ok(error) => OAuthClientError::OAuthError(error),
                Err(_) => OAuthClientError::HttpStatus { status: status.as_u16(), body },
            });
        }

        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| OAuthClientError::ParseError(e.to_string()))?;
        Ok(token_response.into())
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    fn authorization_url(&self, challenge: &PkceChallenge) -> Url {
        self.authorization_url(challenge)
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.exchange_code(code, code_verifier).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uri()
    }
}
