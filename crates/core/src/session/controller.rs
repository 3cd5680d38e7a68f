//! Session controller
//!
//! Owns the single [`AuthSession`] for the process and publishes every
//! change on a watch channel. Consumers read snapshots or subscribe; only
//! the controller writes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use passage_domain::constants::DEFAULT_LOGIN_FAILURE_MESSAGE;
use passage_domain::{
    AuthError, AuthSession, Credentials, LandingOutcome, LandingParams, LogoutPolicy,
    OutgoingRequest, Result, TransportResponse, UserRecord,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::auth::ports::{Location, RequestTransport, UserCache};
use crate::auth::strategy::AuthStrategy;

struct Inner {
    strategy: Arc<dyn AuthStrategy>,
    cache: Arc<dyn UserCache>,
    location: Arc<dyn Location>,
    transport: Arc<dyn RequestTransport>,
    session: watch::Sender<AuthSession>,
    initialized: AtomicBool,
}

/// Single writer of the authentication state
///
/// Cloning shares the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        strategy: Arc<dyn AuthStrategy>,
        cache: Arc<dyn UserCache>,
        location: Arc<dyn Location>,
        transport: Arc<dyn RequestTransport>,
    ) -> Self {
        let (session, _) = watch::channel(AuthSession::loading());
        Self {
            inner: Arc::new(Inner {
                strategy,
                cache,
                location,
                transport,
                session,
                initialized: AtomicBool::new(false),
            }),
        }
    }

    pub fn strategy(&self) -> &Arc<dyn AuthStrategy> {
        &self.inner.strategy
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> AuthSession {
        self.inner.session.borrow().clone()
    }

    /// Receiver that observes every session change
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.inner.session.subscribe()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.borrow().is_authenticated()
    }

    /// Wait for page-load reconciliation to finish
    pub async fn wait_until_ready(&self) -> AuthSession {
        let mut rx = self.subscribe();
        let ready = match rx.wait_for(|session| !session.is_loading).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        };
        ready
    }

    /// Reconcile the session on page load
    ///
    /// The cached user is shown first, then replaced by whatever the landing
    /// parameters or the strategy report. `is_loading` drops to `false`
    /// exactly once; later calls are no-ops.
    #[instrument(skip_all)]
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("session already initialized");
            return;
        }

        match self.inner.cache.load() {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "pre-rendering cached user");
                self.inner.session.send_modify(|s| s.user = Some(user));
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "user cache unreadable"),
        }

        let landing = LandingParams::from_url(&self.inner.location.current_url());
        if landing.is_present() {
            self.inner.location.clear_query();
        }

        match landing.outcome(DEFAULT_LOGIN_FAILURE_MESSAGE) {
            LandingOutcome::Failed(message) => {
                info!("landing reported a failed login");
                self.clear_cache();
                self.inner.session.send_modify(|s| {
                    s.user = None;
                    s.last_error = Some(message);
                });
            }
            LandingOutcome::LoggedIn => {
                let fetched = self.inner.strategy.fetch_user().await;
                self.apply_discovered(fetched);
            }
            LandingOutcome::Unsignalled => {
                let restored = self.inner.strategy.restore_session().await;
                self.apply_discovered(restored);
            }
        }

        self.inner.session.send_modify(|s| s.is_loading = false);
    }

    fn apply_discovered(&self, discovered: Result<Option<UserRecord>>) {
        match discovered {
            Ok(Some(user)) => self.login(user),
            Ok(None) => {
                self.clear_cache();
                self.inner.session.send_modify(|s| s.user = None);
            }
            Err(err) => {
                warn!(error = %err, "could not determine session");
                self.inner.session.send_modify(|s| {
                    s.user = None;
                    s.last_error = Some(err.to_string());
                });
            }
        }
    }

    /// Make `user` the signed-in user
    ///
    /// A re-login of the same user keeps the original `login_time`.
    pub fn login(&self, mut user: UserRecord) {
        let previous_login = self
            .inner
            .session
            .borrow()
            .user
            .as_ref()
            .filter(|current| current.id == user.id)
            .and_then(|current| current.login_time);

        user.login_time = previous_login.or(user.login_time).or_else(|| Some(Utc::now()));

        if let Err(err) = self.inner.cache.store(&user) {
            warn!(error = %err, "failed to cache user");
        }

        info!(user_id = %user.id, method = %user.login_method, "user signed in");
        self.inner.session.send_modify(|s| {
            s.user = Some(user);
            s.last_error = None;
        });
    }

    /// Sign in with username and password
    pub async fn login_with_password(&self, credentials: &Credentials) -> Result<UserRecord> {
        match self.inner.strategy.password_login(credentials).await {
            Ok(user) => {
                self.login(user.clone());
                Ok(user)
            }
            Err(err) => {
                let message = err.to_string();
                self.inner.session.send_modify(|s| s.last_error = Some(message));
                Err(err)
            }
        }
    }

    /// Start a login by redirecting to the provider or the BFF
    pub async fn initiate_login(&self) -> Result<()> {
        let url = self.inner.strategy.initiate_login().await?;
        debug!(host = ?url.host_str(), "redirecting to login");
        self.inner.location.redirect(&url);
        Ok(())
    }

    /// End the session
    ///
    /// On revocation failure the local session is kept or dropped according
    /// to the strategy's [`LogoutPolicy`]; the error is returned either way.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        match self.inner.strategy.revoke_session().await {
            Ok(()) => {
                self.clear_local_session(None).await;
                info!("signed out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "session revocation failed");
                match self.inner.strategy.logout_policy() {
                    LogoutPolicy::AlwaysClear => {
                        self.clear_local_session(Some(err.to_string())).await;
                    }
                    LogoutPolicy::PreserveOnFailure => {
                        let message = err.to_string();
                        self.inner.session.send_modify(|s| s.last_error = Some(message));
                    }
                }
                Err(err)
            }
        }
    }

    async fn clear_local_session(&self, last_error: Option<String>) {
        self.inner.strategy.discard_local_session().await;
        self.clear_cache();
        self.inner.session.send_modify(|s| {
            s.user = None;
            s.last_error = last_error;
        });
    }

    fn clear_cache(&self) {
        if let Err(err) = self.inner.cache.clear() {
            warn!(error = %err, "failed to clear user cache");
        }
    }

    pub fn clear_error(&self) {
        self.inner.session.send_if_modified(|s| s.last_error.take().is_some());
    }

    /// Send a request with the session's credentials attached
    ///
    /// Fails with `Unauthenticated` without touching the network when there
    /// is no session. A failed token refresh signs the user out locally.
    pub async fn request(&self, request: OutgoingRequest) -> Result<TransportResponse> {
        let session = self.snapshot();
        if !self.inner.strategy.has_session_material(&session).await {
            return Err(AuthError::Unauthenticated);
        }

        let request = match self.inner.strategy.authorize(request).await {
            Ok(request) => request,
            Err(err) => {
                if err.requires_relogin() {
                    warn!(error = %err, "credentials unusable, signing out locally");
                    self.clear_local_session(Some(err.to_string())).await;
                }
                return Err(err);
            }
        };

        self.inner.transport.send(request).await
    }
}
