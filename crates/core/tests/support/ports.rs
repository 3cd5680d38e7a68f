//! Recording port implementations for testing
//!
//! Each mock keeps its state behind a `parking_lot::Mutex` so tests can
//! inspect what the code under test did after the fact.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use passage_core::{AuthApi, Location, PendingRequestStore, RequestTransport, UserCache};
use passage_domain::{
    AuthError, Credentials, ExternalLoginRequest, ExternalLoginResponse, OutgoingRequest,
    PasswordLoginResponse, PendingAuthorization, Result as DomainResult, TransportResponse,
    UserInfo, UserRecord,
};
use url::Url;

// ============================================================================
// Pending store
// ============================================================================

/// In-memory `PendingRequestStore`.
#[derive(Default)]
pub struct MemoryPendingStore {
    slot: Mutex<Option<PendingAuthorization>>,
}

impl MemoryPendingStore {
    /// Current attempt without consuming anything.
    pub fn peek(&self) -> Option<PendingAuthorization> {
        self.slot.lock().clone()
    }

    /// Seed an attempt as if `initiate_login` had run.
    pub fn seed(&self, state: &str, code_verifier: Option<&str>) {
        *self.slot.lock() = Some(PendingAuthorization {
            state: state.to_string(),
            code_verifier: code_verifier.map(str::to_string),
        });
    }
}

impl PendingRequestStore for MemoryPendingStore {
    fn save(&self, pending: PendingAuthorization) -> DomainResult<()> {
        *self.slot.lock() = Some(pending);
        Ok(())
    }

    fn take_state(&self) -> Option<String> {
        let mut slot = self.slot.lock();
        let pending = slot.as_mut()?;
        let state = std::mem::take(&mut pending.state);
        if pending.code_verifier.is_none() {
            *slot = None;
        }
        Some(state).filter(|s| !s.is_empty())
    }

    fn code_verifier(&self) -> Option<String> {
        self.slot.lock().as_ref().and_then(|p| p.code_verifier.clone())
    }

    fn discard_verifier(&self) {
        let mut slot = self.slot.lock();
        if let Some(pending) = slot.as_mut() {
            pending.code_verifier = None;
            if pending.state.is_empty() {
                *slot = None;
            }
        }
    }

    fn clear(&self) {
        *self.slot.lock() = None;
    }
}

// ============================================================================
// User cache
// ============================================================================

/// In-memory `UserCache` that can be told to fail writes.
#[derive(Default)]
pub struct MemoryUserCache {
    user: Mutex<Option<UserRecord>>,
    fail_writes: Mutex<bool>,
}

impl MemoryUserCache {
    pub fn put(&self, user: UserRecord) {
        *self.user.lock() = Some(user);
    }

    pub fn current(&self) -> Option<UserRecord> {
        self.user.lock().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }
}

impl UserCache for MemoryUserCache {
    fn load(&self) -> DomainResult<Option<UserRecord>> {
        Ok(self.user.lock().clone())
    }

    fn store(&self, user: &UserRecord) -> DomainResult<()> {
        if *self.fail_writes.lock() {
            return Err(AuthError::Storage("quota exceeded".into()));
        }
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> DomainResult<()> {
        *self.user.lock() = None;
        Ok(())
    }
}

// ============================================================================
// Auth API
// ============================================================================

/// Scripted `AuthApi`.
///
/// Status answers are consumed in order; the last one repeats.
pub struct MockAuthApi {
    statuses: Mutex<VecDeque<DomainResult<bool>>>,
    user: Mutex<DomainResult<Option<UserInfo>>>,
    logout_result: Mutex<DomainResult<()>>,
    password_response: Mutex<Option<PasswordLoginResponse>>,
    external_response: Mutex<Option<ExternalLoginResponse>>,
    status_calls: AtomicUsize,
    user_calls: AtomicUsize,
    logout_bearers: Mutex<Vec<Option<String>>>,
    external_requests: Mutex<Vec<ExternalLoginRequest>>,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::from([Ok(false)])),
            user: Mutex::new(Ok(None)),
            logout_result: Mutex::new(Ok(())),
            password_response: Mutex::new(None),
            external_response: Mutex::new(None),
            status_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            logout_bearers: Mutex::new(Vec::new()),
            external_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockAuthApi {
    pub fn script_status(&self, answers: Vec<DomainResult<bool>>) {
        *self.statuses.lock() = answers.into();
    }

    pub fn set_user(&self, user: DomainResult<Option<UserInfo>>) {
        *self.user.lock() = user;
    }

    pub fn set_logout_result(&self, result: DomainResult<()>) {
        *self.logout_result.lock() = result;
    }

    pub fn set_password_response(&self, response: PasswordLoginResponse) {
        *self.password_response.lock() = Some(response);
    }

    pub fn set_external_response(&self, response: ExternalLoginResponse) {
        *self.external_response.lock() = Some(response);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn logout_bearers(&self) -> Vec<Option<String>> {
        self.logout_bearers.lock().clone()
    }

    pub fn external_requests(&self) -> Vec<ExternalLoginRequest> {
        self.external_requests.lock().clone()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    fn login_url(&self) -> Url {
        Url::parse("http://bff.test/api/auth/login").unwrap()
    }

    async fn current_user(&self) -> DomainResult<Option<UserInfo>> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.user.lock().clone()
    }

    async fn check_status(&self) -> DomainResult<bool> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap_or(Ok(false))
        }
    }

    async fn logout(&self, bearer: Option<&str>) -> DomainResult<()> {
        self.logout_bearers.lock().push(bearer.map(str::to_string));
        self.logout_result.lock().clone()
    }

    async fn password_login(
        &self,
        credentials: &Credentials,
    ) -> DomainResult<PasswordLoginResponse> {
        if credentials.password != "correct-horse" {
            return Err(AuthError::backend_permanent("invalid credentials"));
        }
        self.password_response
            .lock()
            .clone()
            .ok_or_else(|| AuthError::backend_permanent("no scripted password response"))
    }

    async fn external_login(
        &self,
        request: &ExternalLoginRequest,
    ) -> DomainResult<ExternalLoginResponse> {
        self.external_requests.lock().push(request.clone());
        self.external_response
            .lock()
            .clone()
            .ok_or_else(|| AuthError::backend_permanent("no scripted external response"))
    }
}

// ============================================================================
// Location and transport
// ============================================================================

/// `Location` that records redirects and navigations.
pub struct RecordingLocation {
    url: Mutex<Url>,
    redirects: Mutex<Vec<Url>>,
    navigations: Mutex<Vec<String>>,
}

impl RecordingLocation {
    pub fn new(url: &str) -> Self {
        Self {
            url: Mutex::new(Url::parse(url).unwrap()),
            redirects: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn url(&self) -> Url {
        self.url.lock().clone()
    }

    /// Simulate the browser arriving at `url`.
    pub fn set_url(&self, url: &str) {
        *self.url.lock() = Url::parse(url).unwrap();
    }

    pub fn redirects(&self) -> Vec<Url> {
        self.redirects.lock().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }
}

impl Location for RecordingLocation {
    fn current_url(&self) -> Url {
        self.url.lock().clone()
    }

    fn clear_query(&self) {
        self.url.lock().set_query(None);
    }

    fn redirect(&self, url: &Url) {
        self.redirects.lock().push(url.clone());
    }

    fn navigate(&self, route: &str) {
        self.navigations.lock().push(route.to_string());
    }
}

/// `RequestTransport` that records requests and answers 200 `{}`.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingRequest>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutgoingRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl RequestTransport for RecordingTransport {
    async fn send(&self, request: OutgoingRequest) -> DomainResult<TransportResponse> {
        self.sent.lock().push(request);
        Ok(TransportResponse { status: 200, body: b"{}".to_vec() })
    }
}
