//! Callback state machine

use std::sync::Arc;
use std::time::Duration;

use passage_common::auth::validate_state;
use passage_domain::constants::{DEFAULT_LANDING_ROUTE, SUCCESS_DISPLAY_MS};
use passage_domain::{AuthError, CallbackParams, CallbackSettings, Result, UserRecord};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::auth::ports::{Location, PendingRequestStore};
use crate::session::SessionController;

/// What the callback screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackState {
    /// Validating the redirect and resolving the session
    Processing,
    /// Signed in; the landing route follows after the display delay
    Success(UserRecord),
    /// Terminal failure shown to the user
    Error(AuthError),
}

impl CallbackState {
    /// `Success` or `Error`
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// How a callback run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The user was applied to the session
    Success(UserRecord),
    /// The run ended in `CallbackState::Error`
    Failed(AuthError),
    /// The consumer went away before a state was applied
    Cancelled,
}

/// Resolves one callback, once
pub struct CallbackHandler {
    params: CallbackParams,
    controller: SessionController,
    pending: Arc<dyn PendingRequestStore>,
    location: Arc<dyn Location>,
    success_display: Duration,
    landing_route: String,
    status: watch::Sender<CallbackState>,
    cancel: CancellationToken,
}

impl CallbackHandler {
    /// Read the callback parameters from the current location
    pub fn new(
        controller: SessionController,
        pending: Arc<dyn PendingRequestStore>,
        location: Arc<dyn Location>,
    ) -> Self {
        let params = CallbackParams::from_url(&location.current_url());
        let (status, _) = watch::channel(CallbackState::Processing);

        Self {
            params,
            controller,
            pending,
            location,
            success_display: Duration::from_millis(SUCCESS_DISPLAY_MS),
            landing_route: DEFAULT_LANDING_ROUTE.to_string(),
            status,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: &CallbackSettings) -> Self {
        self.success_display = settings.success_display();
        self.landing_route = settings.landing_route.clone();
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: CallbackParams) -> Self {
        self.params = params;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<CallbackState> {
        self.status.subscribe()
    }

    /// Cancel to abandon the run, e.g. when the callback view unmounts
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive the callback to a terminal state
    ///
    /// Order: provider error, missing code, state check, resolution. On
    /// success the user is signed in, `Success` is shown for the display
    /// delay and the app navigates to the landing route.
    #[instrument(skip_all)]
    pub async fn run(self) -> CallbackOutcome {
        let resolved = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                info!("callback abandoned before resolution");
                return CallbackOutcome::Cancelled;
            }
            resolved = self.resolve() => resolved,
        };

        match resolved {
            Ok(user) => {
                self.controller.login(user.clone());
                self.status.send_replace(CallbackState::Success(user.clone()));
                info!(user_id = %user.id, "callback completed");

                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {}
                    () = tokio::time::sleep(self.success_display) => {
                        self.location.navigate(&self.landing_route);
                    }
                }
                CallbackOutcome::Success(user)
            }
            Err(err) => {
                self.pending.clear();
                warn!(error = %err, "callback failed");
                self.status.send_replace(CallbackState::Error(err.clone()));
                CallbackOutcome::Failed(err)
            }
        }
    }

    async fn resolve(&self) -> Result<UserRecord> {
        if let Some(message) = self.params.provider_error() {
            return Err(AuthError::IdentityProvider(message));
        }

        let code = self.params.code.as_deref().ok_or(AuthError::MissingCode)?;

        let expected = self.pending.take_state();
        let received = match (expected.as_deref(), self.params.state.as_deref()) {
            (Some(expected), Some(received)) if validate_state(expected, received) => received,
            _ => return Err(AuthError::InvalidState),
        };

        self.controller.strategy().resolve_callback(code, received).await
    }
}
