//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables (`PASSAGE_MODE` must be set)
//! 3. Otherwise falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! Every setting not named by the chosen source keeps its local-development
//! default.
//!
//! ## Environment Variables
//! - `PASSAGE_MODE`: `direct` or `bff` (required for env loading)
//! - `PASSAGE_LOGOUT_POLICY`: `preserve_on_failure` or `always_clear`
//! - `PASSAGE_AUTHORIZATION_ENDPOINT`, `PASSAGE_TOKEN_ENDPOINT`
//! - `PASSAGE_CLIENT_ID`, `PASSAGE_CLIENT_SECRET`, `PASSAGE_REDIRECT_URI`
//! - `PASSAGE_SCOPES`: space- or comma-separated
//! - `PASSAGE_CALLBACK_RESOLUTION`: `token_exchange` or `external_login`
//! - `PASSAGE_EXTERNAL_PROVIDER`: provider name sent to external-login
//! - `PASSAGE_API_BASE_URL`, `PASSAGE_REQUEST_TIMEOUT_SECS`
//! - `PASSAGE_HTTP_MAX_ATTEMPTS`, `PASSAGE_HTTP_RETRY_BACKOFF_MS`
//! - `PASSAGE_STATUS_CHECK_ATTEMPTS`, `PASSAGE_STATUS_CHECK_DELAY_MS`
//! - `PASSAGE_SUCCESS_DISPLAY_MS`, `PASSAGE_LANDING_ROUTE`
//! - `PASSAGE_USER_CACHE_PATH`
//! - `PASSAGE_LOG_LEVEL`, `PASSAGE_LOG_JSON` (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./passage.json` or `./passage.toml` (current working directory)
//! 2. `./config/passage.json` or `./config/passage.toml`
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use passage_domain::{AuthError, Config, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If `PASSAGE_MODE` is
/// missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AuthError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A variable has an invalid value
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!(mode = %config.mode, "Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `PASSAGE_MODE` must be present; every other variable is optional and
/// overrides the matching default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `AuthError::Config` if `PASSAGE_MODE` is missing or any variable
/// has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config { mode: env_parse("PASSAGE_MODE")?, ..Config::default() };

    if let Some(policy) = env_parse_opt("PASSAGE_LOGOUT_POLICY")? {
        config.logout_policy = Some(policy);
    }

    let oauth = &mut config.oauth;
    env_override("PASSAGE_AUTHORIZATION_ENDPOINT", &mut oauth.authorization_endpoint);
    env_override("PASSAGE_TOKEN_ENDPOINT", &mut oauth.token_endpoint);
    env_override("PASSAGE_CLIENT_ID", &mut oauth.client_id);
    env_override("PASSAGE_REDIRECT_URI", &mut oauth.redirect_uri);
    env_override("PASSAGE_EXTERNAL_PROVIDER", &mut oauth.external_provider);
    if let Some(secret) = env_opt("PASSAGE_CLIENT_SECRET") {
        oauth.client_secret = Some(secret);
    }
    if let Some(scopes) = env_opt("PASSAGE_SCOPES") {
        oauth.scopes = split_scopes(&scopes);
    }
    if let Some(resolution) = env_parse_opt("PASSAGE_CALLBACK_RESOLUTION")? {
        oauth.resolution = resolution;
    }

    env_override("PASSAGE_API_BASE_URL", &mut config.api.base_url);
    if let Some(secs) = env_parse_opt("PASSAGE_REQUEST_TIMEOUT_SECS")? {
        config.api.request_timeout_secs = secs;
    }
    if let Some(attempts) = env_parse_opt("PASSAGE_HTTP_MAX_ATTEMPTS")? {
        config.api.max_attempts = attempts;
    }
    if let Some(backoff) = env_parse_opt("PASSAGE_HTTP_RETRY_BACKOFF_MS")? {
        config.api.retry_backoff_ms = backoff;
    }

    let callback = &mut config.callback;
    if let Some(attempts) = env_parse_opt("PASSAGE_STATUS_CHECK_ATTEMPTS")? {
        callback.status_check_attempts = attempts;
    }
    if let Some(delay) = env_parse_opt("PASSAGE_STATUS_CHECK_DELAY_MS")? {
        callback.status_check_delay_ms = delay;
    }
    if let Some(display) = env_parse_opt("PASSAGE_SUCCESS_DISPLAY_MS")? {
        callback.success_display_ms = display;
    }
    env_override("PASSAGE_LANDING_ROUTE", &mut callback.landing_route);

    if let Some(path) = env_opt("PASSAGE_USER_CACHE_PATH") {
        config.storage.user_cache_path = Some(PathBuf::from(path));
    }

    env_override("PASSAGE_LOG_LEVEL", &mut config.logging.level);
    config.logging.json = env_bool("PASSAGE_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `AuthError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AuthError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AuthError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AuthError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AuthError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AuthError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("passage.json"),
        dir.join("passage.toml"),
        dir.join("config").join("passage.json"),
        dir.join("config").join("passage.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `AuthError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| AuthError::Config(format!("Missing required environment variable: {key}")))
}

/// Non-empty environment variable, if set
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_override(key: &str, target: &mut String) {
    if let Some(value) = env_opt(key) {
        *target = value;
    }
}

fn env_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_var(key)?;
    raw.trim().parse().map_err(|e| AuthError::Config(format!("Invalid {key}: {e}")))
}

fn env_parse_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| raw.trim().parse().map_err(|e| AuthError::Config(format!("Invalid {key}: {e}"))))
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
