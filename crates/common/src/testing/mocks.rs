//! Mock implementations of common traits
//!
//! Mocks record calls so tests can assert on how often the authorization
//! server would have been contacted.

#[cfg(feature = "platform")]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
#[cfg(feature = "platform")]
use std::sync::Arc;

#[cfg(feature = "platform")]
use async_trait::async_trait;
#[cfg(feature = "platform")]
use parking_lot::Mutex;
#[cfg(feature = "platform")]
use url::Url;

#[cfg(feature = "platform")]
use crate::auth::{
    OAuthClientError, OAuthClientTrait, OAuthError, PkceChallenge, TokenSet,
};

#[cfg(feature = "platform")]
const MOCK_AUTHORIZE_URL: &str = "http://mock-auth.test/oauth2/authorize";

/// Mock OAuth client for testing token management and login strategies
///
/// Clones share call counters and configured responses.
#[cfg(feature = "platform")]
#[derive(Debug, Clone)]
pub struct MockOAuthClient {
    exchange_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
    last_exchange: Arc<Mutex<Option<(String, String)>>>,
    exchange_response: Arc<Mutex<Option<TokenSet>>>,
    refresh_response: Arc<Mutex<Option<TokenSet>>>,
    should_fail: Arc<AtomicBool>,
}

#[cfg(feature = "platform")]
impl MockOAuthClient {
    /// Create a new mock OAuth client with default state.
    pub fn new() -> Self {
        Self {
            exchange_calls: Arc::new(AtomicUsize::new(0)),
            refresh_calls: Arc::new(AtomicUsize::new(0)),
            last_exchange: Arc::new(Mutex::new(None)),
            exchange_response: Arc::new(Mutex::new(None)),
            refresh_response: Arc::new(Mutex::new(None)),
            should_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Configure the response returned by `exchange_code`.
    #[must_use]
    pub fn with_exchange_response(self, tokens: TokenSet) -> Self {
        *self.exchange_response.lock() = Some(tokens);
        self
    }

    /// Configure the response returned by `refresh_access_token`.
    #[must_use]
    pub fn with_refresh_response(self, tokens: TokenSet) -> Self {
        *self.refresh_response.lock() = Some(tokens);
        self
    }

    /// Force exchange and refresh calls to fail with `invalid_grant`.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of `exchange_code` calls so far.
    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Number of `refresh_access_token` calls so far.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// `(code, code_verifier)` of the most recent exchange.
    #[must_use]
    pub fn last_exchange(&self) -> Option<(String, String)> {
        self.last_exchange.lock().clone()
    }

    fn rejection() -> OAuthClientError {
        OAuthClientError::OAuthError(OAuthError {
            error: "invalid_grant".to_string(),
            error_description: Some("mock failure".to_string()),
        })
    }
}

#[cfg(feature = "platform")]
impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "platform")]
#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    fn authorization_url(&self, challenge: &PkceChallenge) -> Url {
        let mut url = Url::parse(MOCK_AUTHORIZE_URL).expect("static mock URL");
        url.query_pairs_mut()
            .append_pair("state", &challenge.state)
            .append_pair("code_challenge", &challenge.code_challenge)
            .append_pair("code_challenge_method", challenge.challenge_method());
        url
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_exchange.lock() = Some((code.to_string(), code_verifier.to_string()));

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(Self::rejection());
        }

        Ok(self.exchange_response.lock().clone().unwrap_or_else(|| {
            TokenSet::new(
                "mock_access_token".to_string(),
                Some("mock_refresh_token".to_string()),
                None,
                3600,
                Some("openid profile email".to_string()),
            )
        }))
    }

    async fn refresh_access_token(
        &self,
        _refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(Self::rejection());
        }

        Ok(self.refresh_response.lock().clone().unwrap_or_else(|| {
            TokenSet::new(
                "refreshed_access_token".to_string(),
                Some("refreshed_refresh_token".to_string()),
                None,
                3600,
                Some("openid profile email".to_string()),
            )
        }))
    }

    fn redirect_uri(&self) -> &str {
        "http://localhost:3000/callback"
    }
}
