//! Shared test helpers for `passage-core` integration tests.
//!
//! In-memory ports that record how they were used, plus builders for the
//! two strategy variants wired to them.

#![allow(dead_code)]

pub mod ports;

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use passage_common::testing::MockOAuthClient;
use passage_common::TokenSet;
use passage_core::{BffStrategy, DirectStrategy, SessionController};
use serde_json::Value;

pub use ports::{
    MemoryPendingStore, MemoryUserCache, MockAuthApi, RecordingLocation, RecordingTransport,
};

/// Unsigned JWT carrying `claims`
pub fn jwt(claims: Value) -> String {
    format!("eyJhbGciOiJub25lIn0.{}.sig", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

/// Tokens whose access token expires `offset_secs` from now
pub fn tokens_expiring_in(sub: &str, offset_secs: i64, refresh: Option<&str>) -> TokenSet {
    let exp = chrono::Utc::now().timestamp() + offset_secs;
    TokenSet::new(
        jwt(serde_json::json!({ "sub": sub, "name": "Kim", "exp": exp })),
        refresh.map(str::to_string),
        None,
        0,
        None,
    )
}

/// Everything a test needs to drive one strategy through the controller
pub struct Harness<S> {
    pub strategy: Arc<S>,
    pub controller: SessionController,
    pub pending: Arc<MemoryPendingStore>,
    pub cache: Arc<MemoryUserCache>,
    pub location: Arc<RecordingLocation>,
    pub api: Arc<MockAuthApi>,
    pub transport: Arc<RecordingTransport>,
}

pub fn direct_harness(
    client: MockOAuthClient,
    url: &str,
) -> Harness<DirectStrategy<MockOAuthClient>> {
    let pending = Arc::new(MemoryPendingStore::default());
    let api = Arc::new(MockAuthApi::default());
    let strategy = Arc::new(DirectStrategy::new(Arc::new(client), pending.clone(), api.clone()));
    harness(strategy, pending, api, url)
}

pub fn bff_harness(url: &str) -> Harness<BffStrategy> {
    let pending = Arc::new(MemoryPendingStore::default());
    let api = Arc::new(MockAuthApi::default());
    let strategy = Arc::new(
        BffStrategy::new(api.clone(), pending.clone())
            .with_status_polling(3, Duration::from_secs(1)),
    );
    harness(strategy, pending, api, url)
}

pub fn harness<S: passage_core::AuthStrategy + 'static>(
    strategy: Arc<S>,
    pending: Arc<MemoryPendingStore>,
    api: Arc<MockAuthApi>,
    url: &str,
) -> Harness<S> {
    let cache = Arc::new(MemoryUserCache::default());
    let location = Arc::new(RecordingLocation::new(url));
    let transport = Arc::new(RecordingTransport::default());
    let controller = SessionController::new(
        strategy.clone(),
        cache.clone(),
        location.clone(),
        transport.clone(),
    );

    Harness { strategy, controller, pending, cache, location, api, transport }
}
