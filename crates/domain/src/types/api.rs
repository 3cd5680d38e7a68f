//! Wire DTOs for the application auth API and the BFF

use serde::{Deserialize, Serialize};

use super::user::UserInfo;

/// Username/password login body
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /api/auth/login` response
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordLoginResponse {
    pub user: UserInfo,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// `POST /api/auth/external-login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLoginRequest {
    pub code: String,
    pub state: String,
    pub provider: String,
}

/// `POST /api/auth/external-login` response
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLoginResponse {
    pub user: UserInfo,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// `GET /api/auth/status` response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub authenticated: bool,
}
