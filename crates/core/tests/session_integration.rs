//! Integration tests for the session controller
//!
//! Page-load reconciliation, logout policies, and authorized requests for
//! both strategy variants.

mod support;

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use passage_common::testing::MockOAuthClient;
use passage_core::AuthStrategy;
use passage_domain::constants::DEFAULT_LOGIN_FAILURE_MESSAGE;
use passage_domain::{
    AuthError, Credentials, LoginMethod, OutgoingRequest, PasswordLoginResponse, UserInfo,
    UserRecord,
};
use support::{bff_harness, direct_harness, harness, tokens_expiring_in};
use url::Url;

const HOME: &str = "http://localhost:3000/dashboard";

fn user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: "Kim".to_string(),
        email: "kim@example.com".to_string(),
        avatar: None,
        username: None,
        login_method: LoginMethod::Bff,
        provider: "bff".to_string(),
        login_time: None,
        token_expires_at: None,
        refresh_expires_at: None,
    }
}

fn user_info(sub: &str) -> UserInfo {
    UserInfo { sub: Some(sub.to_string()), name: Some("Kim".into()), ..UserInfo::default() }
}

fn api_request() -> OutgoingRequest {
    OutgoingRequest::get(Url::parse("http://localhost:9091/api/items").unwrap())
}

// ============================================================================
// Page-load reconciliation
// ============================================================================

/// Before `initialize` the session is loading; without any session it ends
/// up signed out with the stale cache removed.
#[tokio::test]
async fn test_initialize_without_session_clears_stale_cache() {
    let h = bff_harness(HOME);
    h.cache.put(user("stale"));
    assert!(h.controller.snapshot().is_loading);

    h.controller.initialize().await;

    let session = h.controller.snapshot();
    assert!(!session.is_loading);
    assert!(session.user.is_none());
    assert!(session.last_error.is_none());
    assert!(h.cache.current().is_none());
    assert_eq!(h.api.status_calls(), 1);
}

/// `?login=failed` reports the default message and never asks the BFF.
#[tokio::test]
async fn test_landing_failure_signal() {
    let h = bff_harness(&format!("{HOME}?login=failed"));
    h.cache.put(user("u1"));

    h.controller.initialize().await;

    let session = h.controller.snapshot();
    assert_eq!(session.last_error.as_deref(), Some(DEFAULT_LOGIN_FAILURE_MESSAGE));
    assert!(session.user.is_none());
    assert!(h.cache.current().is_none());
    assert_eq!(h.api.status_calls() + h.api.user_calls(), 0);
    assert_eq!(h.location.url().query(), None);
}

/// An explicit `error` wins even when `login=success` is also present.
#[tokio::test]
async fn test_landing_error_beats_success() {
    let h = bff_harness(&format!("{HOME}?login=success&error=Account+locked"));

    h.controller.initialize().await;

    assert_eq!(h.controller.snapshot().last_error.as_deref(), Some("Account locked"));
    assert_eq!(h.api.user_calls(), 0);
}

/// `?login=success` goes straight to the user endpoint and strips the query.
#[tokio::test]
async fn test_landing_success_fetches_user() {
    let h = bff_harness(&format!("{HOME}?login=success"));
    h.api.set_user(Ok(Some(user_info("u1"))));

    h.controller.initialize().await;

    let session = h.controller.snapshot();
    assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    assert!(session.user.as_ref().unwrap().login_time.is_some());
    assert_eq!(h.api.status_calls(), 0);
    assert_eq!(h.api.user_calls(), 1);
    assert_eq!(h.cache.current().map(|u| u.id), Some("u1".to_string()));
    assert_eq!(h.location.url().as_str(), HOME);
}

/// Unknown `login` values are stripped and otherwise ignored.
#[tokio::test]
async fn test_unknown_landing_signal_is_ignored() {
    let h = bff_harness(&format!("{HOME}?login=maybe"));
    h.api.script_status(vec![Ok(true)]);
    h.api.set_user(Ok(Some(user_info("u1"))));

    h.controller.initialize().await;

    assert!(h.controller.is_authenticated());
    assert_eq!(h.api.status_calls(), 1);
    assert_eq!(h.location.url().query(), None);
}

/// A backend outage on page load is reported without signing anyone in.
#[tokio::test]
async fn test_backend_outage_on_restore() {
    let h = bff_harness(HOME);
    h.api.script_status(vec![Err(AuthError::backend_transient("502"))]);

    h.controller.initialize().await;

    let session = h.controller.snapshot();
    assert!(!session.is_loading);
    assert!(session.user.is_none());
    assert!(session.last_error.unwrap().contains("502"));
}

/// Reconciliation runs once; subscribers waiting on readiness are released.
#[tokio::test]
async fn test_initialize_runs_once() {
    let h = bff_harness(HOME);
    let ready = {
        let controller = h.controller.clone();
        tokio::spawn(async move { controller.wait_until_ready().await })
    };

    h.controller.initialize().await;
    h.controller.initialize().await;

    assert!(!ready.await.unwrap().is_loading);
    assert_eq!(h.api.status_calls(), 1);
}

/// Waiting after reconciliation returns the settled session at once.
#[tokio::test]
async fn test_wait_until_ready_after_initialize() {
    let h = bff_harness(HOME);
    h.controller.initialize().await;

    let first = h.controller.wait_until_ready().await;
    let second = h.controller.wait_until_ready().await;

    assert!(!first.is_loading);
    assert_eq!(first, second);
}

/// Held tokens are turned back into a user on restore.
#[tokio::test]
async fn test_direct_restore_from_held_tokens() {
    let h = direct_harness(MockOAuthClient::new(), HOME);
    h.strategy.token_manager().store_tokens(tokens_expiring_in("u7", 600, None)).await;

    h.controller.initialize().await;

    let session = h.controller.snapshot();
    let user = session.user.expect("restored");
    assert_eq!(user.id, "u7");
    assert_eq!(user.login_method, LoginMethod::OAuth2);
    assert!(user.token_expires_at.is_some());
}

// ============================================================================
// Login bookkeeping
// ============================================================================

/// Logging in again as the same user keeps the first login time; a
/// different user gets a new one.
#[tokio::test]
async fn test_login_time_preserved_for_same_user() {
    let h = bff_harness(HOME);
    let first = Utc::now() - ChronoDuration::hours(3);

    h.controller.login(UserRecord { login_time: Some(first), ..user("u1") });
    h.controller.login(user("u1"));
    assert_eq!(h.controller.snapshot().user.unwrap().login_time, Some(first));

    h.controller.login(user("u2"));
    assert_ne!(h.controller.snapshot().user.unwrap().login_time, Some(first));
}

/// A full user cache does not stop the login.
#[tokio::test]
async fn test_cache_failure_does_not_block_login() {
    let pending = Arc::new(support::MemoryPendingStore::default());
    let api = Arc::new(support::MockAuthApi::default());
    let strategy = Arc::new(passage_core::BffStrategy::new(api.clone(), pending.clone()));
    let h = harness(strategy, pending, api, HOME);
    h.cache.set_fail_writes(true);

    h.controller.login(user("u1"));

    assert!(h.controller.is_authenticated());
    assert!(h.cache.current().is_none());
}

/// Password login stores tokens and normalizes the user as a local login.
#[tokio::test]
async fn test_password_login() {
    let h = direct_harness(MockOAuthClient::new(), HOME);
    h.api.set_password_response(PasswordLoginResponse {
        user: UserInfo { id: Some(serde_json::json!("u3")), ..UserInfo::default() },
        access_token: "opaque-access".to_string(),
        refresh_token: Some("opaque-refresh".to_string()),
        expires_in: Some(900),
    });

    let user = h
        .controller
        .login_with_password(&Credentials::new("kim", "correct-horse"))
        .await
        .unwrap();

    assert_eq!(user.login_method, LoginMethod::Password);
    assert_eq!(user.provider, "local");
    assert!(user.token_expires_at.is_some());
    assert_eq!(
        h.strategy.token_manager().access_token().await.as_deref(),
        Some("opaque-access")
    );

    let rejected = h.controller.login_with_password(&Credentials::new("kim", "wrong")).await;
    assert!(rejected.is_err());
    assert!(h.controller.snapshot().last_error.is_some());

    h.controller.clear_error();
    assert!(h.controller.snapshot().last_error.is_none());
}

// ============================================================================
// Logout
// ============================================================================

/// A BFF that fails to revoke keeps the user signed in, with an error.
#[tokio::test]
async fn test_bff_logout_failure_preserves_session() {
    let h = bff_harness(HOME);
    h.controller.login(user("u1"));
    h.api.set_logout_result(Err(AuthError::backend_transient("500")));

    let result = h.controller.logout().await;

    assert!(matches!(result, Err(AuthError::RevocationFailed(_))));
    let session = h.controller.snapshot();
    assert_eq!(session.user.map(|u| u.id), Some("u1".to_string()));
    assert!(session.last_error.is_some());
    assert!(h.cache.current().is_some());
}

/// Successful BFF logout clears everything.
#[tokio::test]
async fn test_bff_logout_success() {
    let h = bff_harness(HOME);
    h.controller.login(user("u1"));

    h.controller.logout().await.unwrap();

    assert!(!h.controller.is_authenticated());
    assert!(h.cache.current().is_none());
    assert_eq!(h.api.logout_bearers(), vec![None]);
}

/// Direct logout sends the bearer and, on failure, still signs out locally.
#[tokio::test]
async fn test_direct_logout_failure_clears_locally() {
    let h = direct_harness(MockOAuthClient::new(), HOME);
    let tokens = tokens_expiring_in("u1", 600, Some("rt"));
    let access = tokens.access_token.clone();
    h.strategy.token_manager().store_tokens(tokens).await;
    h.controller.login(user("u1"));
    h.api.set_logout_result(Err(AuthError::RevocationFailed("503".into())));

    let result = h.controller.logout().await;

    assert_eq!(result, Err(AuthError::RevocationFailed("503".into())));
    assert_eq!(h.api.logout_bearers(), vec![Some(access)]);
    assert!(!h.controller.is_authenticated());
    assert!(h.strategy.token_manager().get_tokens().await.is_none());
    assert!(h.controller.snapshot().last_error.is_some());
}

// ============================================================================
// Authorized requests
// ============================================================================

/// Without a session nothing is sent.
#[tokio::test]
async fn test_request_without_session() {
    let h = direct_harness(MockOAuthClient::new(), HOME);

    let result = h.controller.request(api_request()).await;

    assert_eq!(result, Err(AuthError::Unauthenticated));
    assert!(h.transport.sent().is_empty());
}

/// A valid access token is attached as a bearer header.
#[tokio::test]
async fn test_direct_request_carries_bearer() {
    let h = direct_harness(MockOAuthClient::new(), HOME);
    let tokens = tokens_expiring_in("u1", 600, None);
    let expected = format!("Bearer {}", tokens.access_token);
    h.strategy.token_manager().store_tokens(tokens).await;

    let response = h.controller.request(api_request()).await.unwrap();

    assert!(response.is_success());
    let sent = h.transport.sent();
    assert_eq!(sent[0].header_value("authorization"), Some(expected.as_str()));
}

/// An expired token with a dead refresh token signs the user out.
#[tokio::test]
async fn test_direct_request_refresh_failure_signs_out() {
    let client = MockOAuthClient::new();
    client.set_should_fail(true);
    let h = direct_harness(client.clone(), HOME);
    h.strategy.token_manager().store_tokens(tokens_expiring_in("u1", -60, Some("rt"))).await;
    h.controller.login(user("u1"));

    let result = h.controller.request(api_request()).await;

    assert!(matches!(result, Err(AuthError::RefreshFailed(_))), "{result:?}");
    assert_eq!(client.refresh_calls(), 1);
    assert!(!h.controller.is_authenticated());
    assert!(h.transport.sent().is_empty());
}

/// An expired token without a refresh token fails with `NoRefreshToken`.
#[tokio::test]
async fn test_direct_request_without_refresh_token() {
    let h = direct_harness(MockOAuthClient::new(), HOME);
    h.strategy.token_manager().store_tokens(tokens_expiring_in("u1", -60, None)).await;

    let result = h.controller.request(api_request()).await;

    assert_eq!(result, Err(AuthError::NoRefreshToken));
    assert!(h.strategy.token_manager().get_tokens().await.is_none());
}

/// BFF requests ride on the session cookie.
#[tokio::test]
async fn test_bff_request_is_credentialed() {
    let h = bff_harness(HOME);
    h.controller.login(user("u1"));

    h.controller.request(api_request()).await.unwrap();

    let sent = h.transport.sent();
    assert!(sent[0].with_credentials);
    assert_eq!(sent[0].header_value("authorization"), None);
    assert_eq!(h.strategy.mode(), passage_domain::AuthMode::Bff);
}

/// A failed user fetch after `?login=success` reports the error but leaves
/// the cache for the next load.
#[tokio::test]
async fn test_landing_success_with_backend_error_keeps_cache() {
    let h = bff_harness(&format!("{HOME}?login=success"));
    h.cache.put(user("cached"));
    h.api.set_user(Err(AuthError::backend_transient("503")));

    h.controller.initialize().await;

    let session = h.controller.snapshot();
    assert!(session.user.is_none());
    assert!(session.last_error.is_some());
    assert_eq!(h.cache.current().map(|u| u.id), Some("cached".to_string()));
}
