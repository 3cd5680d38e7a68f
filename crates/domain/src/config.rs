//! Configuration structures
//!
//! Every section derives `Default` with the local development values and is
//! `#[serde(default)]`, so a config file only needs the keys it overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AUTHORIZE_PATH, DEFAULT_API_BASE_URL, DEFAULT_AUTH_SERVER_URL, DEFAULT_CLIENT_ID,
    DEFAULT_CLIENT_SECRET, DEFAULT_EXTERNAL_PROVIDER, DEFAULT_HTTP_MAX_ATTEMPTS,
    DEFAULT_HTTP_RETRY_BACKOFF_MS, DEFAULT_LANDING_ROUTE, DEFAULT_REDIRECT_URI,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SCOPES, STATUS_CHECK_ATTEMPTS, STATUS_CHECK_DELAY_MS,
    SUCCESS_DISPLAY_MS, TOKEN_PATH,
};
use crate::types::{AuthMode, CallbackResolution, LogoutPolicy};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: AuthMode,
    /// Overrides the per-mode default when set
    pub logout_policy: Option<LogoutPolicy>,
    pub oauth: OAuthSettings,
    pub api: ApiSettings,
    pub callback: CallbackSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl Config {
    pub fn effective_logout_policy(&self) -> LogoutPolicy {
        self.logout_policy.unwrap_or_else(|| LogoutPolicy::default_for(self.mode))
    }
}

/// Authorization server settings (direct PKCE variant)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    /// Sent as HTTP Basic credentials when present; `null` makes a public
    /// client that sends `client_id` in the form body instead
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub resolution: CallbackResolution,
    pub external_provider: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            authorization_endpoint: format!("{DEFAULT_AUTH_SERVER_URL}{AUTHORIZE_PATH}"),
            token_endpoint: format!("{DEFAULT_AUTH_SERVER_URL}{TOKEN_PATH}"),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: Some(DEFAULT_CLIENT_SECRET.to_string()),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            resolution: CallbackResolution::default(),
            external_provider: DEFAULT_EXTERNAL_PROVIDER.to_string(),
        }
    }
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("resolution", &self.resolution)
            .field("external_provider", &self.external_provider)
            .finish()
    }
}

/// Application auth API / BFF settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Attempts per API request, first try included; 5xx and connection
    /// failures are retried with exponential backoff
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_HTTP_RETRY_BACKOFF_MS,
        }
    }
}

impl ApiSettings {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Callback handler timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackSettings {
    pub status_check_attempts: u32,
    pub status_check_delay_ms: u64,
    pub success_display_ms: u64,
    pub landing_route: String,
}

impl Default for CallbackSettings {
    fn default() -> Self {
        Self {
            status_check_attempts: STATUS_CHECK_ATTEMPTS,
            status_check_delay_ms: STATUS_CHECK_DELAY_MS,
            success_display_ms: SUCCESS_DISPLAY_MS,
            landing_route: DEFAULT_LANDING_ROUTE.to_string(),
        }
    }
}

impl CallbackSettings {
    pub const fn status_check_delay(&self) -> Duration {
        Duration::from_millis(self.status_check_delay_ms)
    }

    pub const fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

/// Durable storage for the pre-render user cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `None` keeps the cache in memory only
    pub user_cache_path: Option<PathBuf>,
}

/// Logging bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
