//! OAuth 2.0 types and structures
//!
//! Token sets, token endpoint responses, client configuration, and the
//! RFC 6749 error body.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::claims::{self, RegisteredClaims};

/// OAuth 2.0 access and refresh tokens with metadata
///
/// Held in process memory only. `Debug` is redacted so a token set can sit
/// inside structs that get logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (JWT) containing user claims (OpenID Connect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Token type (always "Bearer" for OAuth 2.0)
    pub token_type: String,

    /// Access token lifetime in seconds (0 when the server did not say)
    pub expires_in: i64,

    /// Absolute expiration timestamp computed from `expires_in`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        id_token: Option<String>,
        expires_in: i64,
        scope: Option<String>,
    ) -> Self {
        let expires_at = (expires_in > 0).then(|| Utc::now() + chrono::Duration::seconds(expires_in));

        Self {
            access_token,
            refresh_token,
            id_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Keep the previous refresh token when a refresh response omits one
    #[must_use]
    pub fn inherit_refresh_token(mut self, previous: Option<&str>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.map(str::to_string);
        }
        self
    }

    /// Whether the access token's `exp` claim lies in the past
    ///
    /// Only the token itself is consulted. An opaque or undecodable token is
    /// treated as server-managed and reported as not expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        claims::is_expired_at(&self.access_token, now)
    }

    /// Access token expiry in epoch seconds, from `exp` or `expires_at`
    #[must_use]
    pub fn access_expires_at_secs(&self) -> Option<i64> {
        claims::decode_claims::<RegisteredClaims>(&self.access_token)
            .ok()
            .and_then(|c| c.expires_at_secs())
            .or_else(|| self.expires_at.map(|at| at.timestamp()))
    }

    /// Refresh token expiry in epoch seconds, when the refresh token is a JWT
    #[must_use]
    pub fn refresh_expires_at_secs(&self) -> Option<i64> {
        self.refresh_token
            .as_deref()
            .and_then(|token| claims::decode_claims::<RegisteredClaims>(token).ok())
            .and_then(|c| c.expires_at_secs())
    }

    /// Token whose claims describe the user: the ID token when issued
    #[must_use]
    pub fn identity_token(&self) -> &str {
        self.id_token.as_deref().unwrap_or(&self.access_token)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth token response from authorization server (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.id_token,
            response.expires_in.unwrap_or(0),
            response.scope,
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

/// OAuth client configuration
#[derive(Clone)]
pub struct OAuthConfig {
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub client_id: String,
    /// Confidential clients authenticate to the token endpoint with HTTP
    /// Basic; public clients send `client_id` in the form body instead.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authorization_endpoint", &self.authorization_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// OAuth error response from authorization server (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
