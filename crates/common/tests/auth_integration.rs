//! Integration tests for auth module
//!
//! Drives the OAuth client against a wiremock authorization server and the
//! token manager through full exchange and refresh cycles.

#![cfg(feature = "platform")]

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use passage_common::auth::{
    generate_code_challenge, OAuthClient, OAuthConfig, PkceChallenge,
    TokenManager, TokenManagerError,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OAuthConfig {
    OAuthConfig {
        authorization_endpoint: format!("{}/oauth2/authorize", server.uri()).parse().unwrap(),
        token_endpoint: format!("{}/oauth2/token", server.uri()).parse().unwrap(),
        client_id: "frontend-client".to_string(),
        client_secret: None,
        redirect_uri: "http://localhost:3000/callback".to_string(),
        scopes: vec!["openid".into(), "profile".into(), "email".into()],
    }
}

fn jwt(claims: serde_json::Value) -> String {
    format!("eyJhbGciOiJub25lIn0.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

// ============================================================================
// Authorization request
// ============================================================================

/// The challenge in the authorization URL is the S256 hash of the verifier
/// that will later be sent to the token endpoint.
#[tokio::test]
async fn test_authorization_url_binds_verifier() {
    let server = MockServer::start().await;
    let client = OAuthClient::new(config_for(&server)).unwrap();
    let challenge = PkceChallenge::generate().unwrap();

    let url = client.authorization_url(&challenge);
    let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

    assert_eq!(query["code_challenge"], generate_code_challenge(&challenge.code_verifier));
    assert_eq!(query["scope"], "openid profile email");
    assert_eq!(query["state"], challenge.state);
}

// ============================================================================
// Code exchange and refresh
// ============================================================================

/// A full PKCE exchange followed by a refresh that does not rotate the
/// refresh token.
#[tokio::test]
async fn test_exchange_then_refresh_keeps_refresh_token() {
    let server = MockServer::start().await;
    let challenge = PkceChallenge::generate().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains(format!("code_verifier={}", challenge.code_verifier)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": jwt(json!({ "sub": "u1", "exp": 1 })),
            "refresh_token": "rt-1",
            "id_token": jwt(json!({ "sub": "u1", "name": "Kim" })),
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fresh_access = jwt(json!({ "sub": "u1", "exp": chrono::Utc::now().timestamp() + 3600 }));
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=rt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": fresh_access,
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(OAuthClient::new(config_for(&server)).unwrap());
    let manager = TokenManager::new(Arc::clone(&client));

    let tokens = client.exchange_code("abc123", &challenge.code_verifier).await.unwrap();
    assert!(tokens.id_token.is_some());
    manager.store_tokens(tokens).await;

    // The stored access token carries exp = 1, long past.
    assert!(manager.is_expired().await);
    let access = manager.get_access_token().await.unwrap();

    assert_eq!(access, fresh_access);
    let stored = manager.get_tokens().await.unwrap();
    assert_eq!(stored.refresh_token.as_deref(), Some("rt-1"));
    assert!(!manager.is_expired().await);
}

/// A rejected refresh leaves the manager empty.
#[tokio::test]
async fn test_rejected_refresh_clears_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        })))
        .mount(&server)
        .await;

    let client = Arc::new(OAuthClient::new(config_for(&server)).unwrap());
    let manager = TokenManager::new(client);
    manager
        .store_tokens(passage_common::TokenSet::new(
            "opaque".into(),
            Some("revoked".into()),
            None,
            3600,
            None,
        ))
        .await;

    match manager.refresh_tokens().await {
        Err(TokenManagerError::RefreshFailed(message)) => {
            assert!(message.contains("refresh token revoked"), "{message}");
        }
        other => panic!("expected RefreshFailed, got {other:?}"),
    }
    assert!(manager.get_tokens().await.is_none());
    assert!(manager.is_expired().await);
}
