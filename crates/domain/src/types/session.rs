//! Session state types

use serde::{Deserialize, Serialize};

use super::user::UserRecord;
use crate::impl_domain_enum_conversions;

/// Where the session lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Browser-side PKCE, tokens held in process memory
    Direct,
    /// Backend-For-Frontend holds tokens, client only carries a cookie
    #[default]
    Bff,
}

impl_domain_enum_conversions!(AuthMode {
    Direct => "direct",
    Bff => "bff",
});

/// What `logout` does with local state when revocation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutPolicy {
    /// Keep the local user until the server confirms revocation
    PreserveOnFailure,
    /// Clear local state whatever the server says
    AlwaysClear,
}

impl_domain_enum_conversions!(LogoutPolicy {
    PreserveOnFailure => "preserve_on_failure",
    AlwaysClear => "always_clear",
});

impl LogoutPolicy {
    /// Policy used when none is configured
    pub const fn default_for(mode: AuthMode) -> Self {
        match mode {
            AuthMode::Bff => Self::PreserveOnFailure,
            AuthMode::Direct => Self::AlwaysClear,
        }
    }
}

/// How the direct variant turns an authorization code into a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackResolution {
    /// POST the code and verifier to the token endpoint
    #[default]
    TokenExchange,
    /// POST `{code, state, provider}` to the application's external-login
    /// endpoint
    ExternalLogin,
}

impl_domain_enum_conversions!(CallbackResolution {
    TokenExchange => "token_exchange",
    ExternalLogin => "external_login",
});

/// Process-wide authentication state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: Option<UserRecord>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl AuthSession {
    /// State before page-load reconciliation has finished
    pub const fn loading() -> Self {
        Self { user: None, is_loading: true, last_error: None }
    }

    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::loading()
    }
}

/// One in-flight login attempt
///
/// Lives in the tab-scoped pending store between `initiate_login` and the
/// callback. `code_verifier` is only set for the direct PKCE variant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: Option<String>,
}

impl std::fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("state", &"<redacted>")
            .field("code_verifier", &self.code_verifier.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
