//! Integration tests for the file-backed user cache
//!
//! Each test works in its own temporary directory.

use chrono::{TimeZone, Utc};
use passage_core::UserCache;
use passage_domain::{AuthError, LoginMethod, UserRecord};
use passage_infra::FileUserCache;
use tempfile::TempDir;

fn user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: "Kim".to_string(),
        email: "kim@example.com".to_string(),
        avatar: None,
        username: Some("kim".to_string()),
        login_method: LoginMethod::OAuth2,
        provider: "oauth2".to_string(),
        login_time: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
        token_expires_at: Some(1_772_400_000),
        refresh_expires_at: None,
    }
}

#[test]
fn test_missing_file_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let cache = FileUserCache::in_dir(dir.path());

    assert_eq!(cache.load().unwrap(), None);
}

#[test]
fn test_store_then_load_survives_a_new_instance() {
    let dir = TempDir::new().unwrap();
    FileUserCache::in_dir(dir.path()).store(&user("u-1")).unwrap();

    let reopened = FileUserCache::in_dir(dir.path());

    assert_eq!(reopened.load().unwrap(), Some(user("u-1")));
    assert!(!dir.path().join("user.json.tmp").exists());
}

#[test]
fn test_store_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let cache = FileUserCache::new(dir.path().join("nested").join("profile").join("user.json"));

    cache.store(&user("u-2")).unwrap();

    assert_eq!(cache.load().unwrap().map(|u| u.id), Some("u-2".to_string()));
}

#[test]
fn test_file_is_camel_case_json_without_tokens() {
    let dir = TempDir::new().unwrap();
    let cache = FileUserCache::in_dir(dir.path());
    cache.store(&user("u-3")).unwrap();

    let raw = std::fs::read_to_string(cache.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["loginMethod"], "oauth2");
    assert!(json.get("accessToken").is_none());
    assert!(!raw.contains("refresh_token"));
}

#[test]
fn test_clear_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let cache = FileUserCache::in_dir(dir.path());
    cache.store(&user("u-4")).unwrap();

    cache.clear().unwrap();
    cache.clear().unwrap();

    assert_eq!(cache.load().unwrap(), None);
}

#[test]
fn test_corrupt_file_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let cache = FileUserCache::in_dir(dir.path());
    std::fs::write(cache.path(), b"{ not json").unwrap();

    let err = cache.load().unwrap_err();

    assert!(matches!(err, AuthError::Storage(message) if message.contains("corrupt")));
}
