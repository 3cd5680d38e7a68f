//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use passage_domain::{AuthMode, CallbackResolution, LogoutPolicy};
use passage_infra::config;
use tempfile::NamedTempFile;

fn write_with_extension(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "mode": "direct",
        "logout_policy": "preserve_on_failure",
        "oauth": {
            "authorization_endpoint": "https://id.example.com/oauth2/authorize",
            "token_endpoint": "https://id.example.com/oauth2/token",
            "client_id": "spa",
            "scopes": ["openid", "offline_access"],
            "resolution": "external_login",
            "external_provider": "github"
        },
        "api": { "base_url": "https://app.example.com", "request_timeout_secs": 10 },
        "storage": { "user_cache_path": "/tmp/passage-it/user.json" }
    }"#;
    let path = write_with_extension(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("config from JSON file");
    std::fs::remove_file(path).ok();

    assert_eq!(config.mode, AuthMode::Direct);
    assert_eq!(config.effective_logout_policy(), LogoutPolicy::PreserveOnFailure);
    assert_eq!(config.oauth.client_id, "spa");
    assert_eq!(config.oauth.scopes, vec!["openid", "offline_access"]);
    assert_eq!(config.oauth.resolution, CallbackResolution::ExternalLogin);
    assert_eq!(config.oauth.external_provider, "github");
    assert_eq!(config.api.request_timeout_secs, 10);
    assert!(config.storage.user_cache_path.is_some());

    // Untouched sections keep their defaults
    assert_eq!(config.callback.status_check_attempts, 3);
    assert_eq!(config.callback.landing_route, "/dashboard");
    assert_eq!(config.oauth.client_secret.as_deref(), Some("frontend-secret"));
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
mode = "bff"

[api]
base_url = "https://bff.example.com"

[callback]
status_check_attempts = 5
status_check_delay_ms = 250
success_display_ms = 0
landing_route = "/home"

[logging]
level = "passage=debug"
json = true
"#;
    let path = write_with_extension(toml_content, "toml");

    let config = config::load_from_file(Some(path.clone())).expect("config from TOML file");
    std::fs::remove_file(path).ok();

    assert_eq!(config.mode, AuthMode::Bff);
    assert_eq!(config.effective_logout_policy(), LogoutPolicy::PreserveOnFailure);
    assert_eq!(config.api.base_url, "https://bff.example.com");
    assert_eq!(config.callback.status_check_attempts, 5);
    assert_eq!(config.callback.status_check_delay_ms, 250);
    assert_eq!(config.callback.success_display_ms, 0);
    assert_eq!(config.callback.landing_route, "/home");
    assert_eq!(config.logging.level, "passage=debug");
    assert!(config.logging.json);
}

#[test]
fn test_load_config_public_client() {
    let json_content = r#"{
        "mode": "direct",
        "oauth": { "client_id": "spa", "client_secret": null }
    }"#;
    let path = write_with_extension(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("config from JSON file");
    std::fs::remove_file(path).ok();

    assert_eq!(config.oauth.client_id, "spa");
    assert!(config.oauth.client_secret.is_none());
}

#[test]
fn test_load_config_rejects_unknown_mode() {
    let path = write_with_extension(r#"{ "mode": "implicit" }"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(result.is_err(), "unknown mode should not parse");
}

#[test]
fn test_load_config_invalid_toml() {
    let path = write_with_extension("mode = [bff", "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(result.is_err(), "malformed TOML should not parse");
}
