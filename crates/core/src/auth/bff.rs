//! Backend-For-Frontend strategy
//!
//! The BFF holds the tokens and an HTTP-only session cookie; this side only
//! ever sees the session's existence and the user it belongs to.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use passage_common::auth::generate_state;
use passage_common::resilience::policies::PredicateRetry;
use passage_common::resilience::{RetryConfig, RetryError, RetryExecutor};
use passage_domain::constants::{
    PARAM_STATE, PROVIDER_BFF, STATUS_CHECK_ATTEMPTS, STATUS_CHECK_DELAY_MS,
};
use passage_domain::{
    AuthError, AuthMode, AuthSession, Credentials, LoginMethod, LogoutPolicy, OutgoingRequest,
    PendingAuthorization, Result, UserRecord,
};
use tracing::{debug, info, instrument};
use url::Url;

use super::ports::{AuthApi, PendingRequestStore};
use super::strategy::{revocation_error, AuthStrategy};

/// Session held server-side behind a cookie
pub struct BffStrategy {
    api: Arc<dyn AuthApi>,
    pending: Arc<dyn PendingRequestStore>,
    status_polling: RetryConfig,
    logout_policy: LogoutPolicy,
}

impl BffStrategy {
    pub fn new(api: Arc<dyn AuthApi>, pending: Arc<dyn PendingRequestStore>) -> Self {
        Self {
            api,
            pending,
            status_polling: RetryConfig::fixed(
                STATUS_CHECK_ATTEMPTS,
                Duration::from_millis(STATUS_CHECK_DELAY_MS),
            ),
            logout_policy: LogoutPolicy::default_for(AuthMode::Bff),
        }
    }

    /// How often to ask `/status` before giving up on a callback
    #[must_use]
    pub fn with_status_polling(mut self, attempts: u32, delay: Duration) -> Self {
        self.status_polling = RetryConfig::fixed(attempts, delay);
        self
    }

    #[must_use]
    pub fn with_logout_policy(mut self, policy: LogoutPolicy) -> Self {
        self.logout_policy = policy;
        self
    }

    /// Poll the status endpoint until the BFF reports a session
    ///
    /// "Not yet authenticated" and transient backend failures are retried on
    /// a fixed delay. A permanent failure is returned immediately.
    #[instrument(skip_all)]
    pub async fn await_session(&self) -> Result<()> {
        let executor = RetryExecutor::new(
            self.status_polling.clone(),
            PredicateRetry::new(retry_status_check),
        );

        let outcome = executor
            .execute(|| {
                let api = Arc::clone(&self.api);
                async move {
                    if api.check_status().await? {
                        Ok(())
                    } else {
                        Err(AuthError::backend_transient("session not established yet"))
                    }
                }
            })
            .await;

        outcome.map_err(|err| match err {
            RetryError::AttemptsExhausted { attempts, last } => AuthError::backend_transient(
                format!("session not confirmed after {attempts} status checks: {last}"),
            ),
            RetryError::NonRetryable { error } => error,
            RetryError::InvalidConfiguration { message } => AuthError::Config(message),
        })
    }

    async fn current_user(&self) -> Result<Option<UserRecord>> {
        match self.api.current_user().await? {
            Some(info) => Ok(Some(info.into_user(LoginMethod::Bff, PROVIDER_BFF)?)),
            None => Ok(None),
        }
    }
}

fn retry_status_check(err: &AuthError, _attempt: u32) -> bool {
    err.is_retryable()
}

#[async_trait]
impl AuthStrategy for BffStrategy {
    fn mode(&self) -> AuthMode {
        AuthMode::Bff
    }

    fn logout_policy(&self) -> LogoutPolicy {
        self.logout_policy
    }

    async fn initiate_login(&self) -> Result<Url> {
        let state = generate_state().map_err(|e| AuthError::Internal(e.to_string()))?;
        self.pending.save(PendingAuthorization { state: state.clone(), code_verifier: None })?;

        let mut url = self.api.login_url();
        url.query_pairs_mut().append_pair(PARAM_STATE, &state);
        Ok(url)
    }

    async fn resolve_callback(&self, _code: &str, _state: &str) -> Result<UserRecord> {
        self.await_session().await?;

        let user = self.current_user().await?.ok_or(AuthError::Unauthenticated)?;
        info!(user_id = %user.id, "BFF session confirmed");
        Ok(user)
    }

    async fn fetch_user(&self) -> Result<Option<UserRecord>> {
        self.current_user().await
    }

    async fn restore_session(&self) -> Result<Option<UserRecord>> {
        if !self.api.check_status().await? {
            debug!("no BFF session");
            return Ok(None);
        }
        self.current_user().await
    }

    async fn revoke_session(&self) -> Result<()> {
        self.api.logout(None).await.map_err(revocation_error)
    }

    async fn has_session_material(&self, session: &AuthSession) -> bool {
        session.is_authenticated()
    }

    async fn authorize(&self, request: OutgoingRequest) -> Result<OutgoingRequest> {
        Ok(request.credentialed())
    }

    async fn discard_local_session(&self) {
        self.pending.clear();
    }

    async fn password_login(&self, _credentials: &Credentials) -> Result<UserRecord> {
        Err(AuthError::Config("password login is handled by the BFF login page".to_string()))
    }
}
