//! User record types
//!
//! The signed-in user as the session controller sees it, plus the loose
//! payload shapes it is built from (token claims, BFF user-info, login API).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_USER_NAME;
use crate::errors::{AuthError, Result};
use crate::impl_domain_enum_conversions;

/// How the current user authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// Username and password against the application API
    Password,
    /// Direct Authorization Code + PKCE, tokens held in memory
    OAuth2,
    /// Session held by the Backend-For-Frontend
    Bff,
    /// Code-for-session exchange with an external provider
    External,
}

impl_domain_enum_conversions!(LoginMethod {
    Password => "password",
    OAuth2 => "oauth2",
    Bff => "bff",
    External => "external",
});

/// Signed-in user, owned by the session controller
///
/// Serialized in camelCase because the same record is mirrored to the
/// durable user cache and read back on the next start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub login_method: LoginMethod,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_time: Option<DateTime<Utc>>,
    /// Access token expiry, epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<i64>,
    /// Refresh token expiry, epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_at: Option<i64>,
}

impl UserRecord {
    /// Attach token expiry timestamps (epoch seconds)
    #[must_use]
    pub fn with_token_expiry(mut self, access: Option<i64>, refresh: Option<i64>) -> Self {
        self.token_expires_at = access;
        self.refresh_expires_at = refresh;
        self
    }
}

/// Loose user payload
///
/// Accepts OIDC claims (`sub`, `picture`, `preferred_username`) as well as
/// application API shapes (`id`, `avatar`, `username`). Unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub sub: Option<String>,
    /// Some backends send numeric ids
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl UserInfo {
    /// Identifier, preferring `sub` over `id`
    pub fn identifier(&self) -> Option<String> {
        if let Some(sub) = self.sub.as_deref().filter(|s| !s.is_empty()) {
            return Some(sub.to_string());
        }
        match &self.id {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Normalize into a [`UserRecord`]
    ///
    /// `provider` is used when the payload does not name one.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidResponse` when neither `sub` nor `id` is
    /// present.
    pub fn into_user(self, login_method: LoginMethod, provider: &str) -> Result<UserRecord> {
        let id = self
            .identifier()
            .ok_or_else(|| AuthError::InvalidResponse("user payload has no sub or id".into()))?;
        let username = self.username.or(self.preferred_username);
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| username.clone())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        Ok(UserRecord {
            id,
            name,
            email: self.email.unwrap_or_default(),
            avatar: self.picture.or(self.avatar),
            username,
            login_method,
            provider: self.provider.unwrap_or_else(|| provider.to_string()),
            login_time: None,
            token_expires_at: None,
            refresh_expires_at: None,
        })
    }
}

/// BFF user-info response: either `{ "user": {...} }` or the bare object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserInfoEnvelope {
    Wrapped { user: UserInfo },
    Bare(UserInfo),
}

impl UserInfoEnvelope {
    pub fn into_inner(self) -> UserInfo {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}
