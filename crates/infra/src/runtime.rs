//! Runtime wiring
//!
//! Builds the adapters named by a [`Config`] and hands them to the session
//! controller. This is the only place that knows which strategy is live.

use std::sync::Arc;

use passage_common::{OAuthClient, OAuthConfig};
use passage_core::{
    AuthStrategy, BffStrategy, CallbackHandler, DirectStrategy, PendingRequestStore,
    SessionController, UserCache,
};
use passage_domain::{AuthError, AuthMode, CallbackResolution, Config, OAuthSettings, Result};
use tracing::info;
use url::Url;

use crate::api::{AuthApiClient, ReqwestTransport};
use crate::http::{HttpClient, HttpClientBuilder};
use crate::location::MemoryLocation;
use crate::storage::{FileUserCache, InMemoryPendingStore, InMemoryUserCache};

const USER_AGENT: &str = concat!("passage/", env!("CARGO_PKG_VERSION"));

/// A wired-up client: one session controller plus the adapters behind it
pub struct PassageRuntime {
    config: Config,
    controller: SessionController,
    pending: Arc<InMemoryPendingStore>,
    location: Arc<MemoryLocation>,
}

impl PassageRuntime {
    /// Wire every adapter for `config`, starting on `start_url`
    ///
    /// # Errors
    /// Returns `AuthError::Config` for unparsable endpoints or when an HTTP
    /// client cannot be built.
    pub fn build(config: Config, start_url: Url) -> Result<Self> {
        let credentialed = api_http_client(&config).cookie_store(true).build()?;
        let anonymous = api_http_client(&config).build()?;

        let api = Arc::new(AuthApiClient::new(&config.api.base_url, credentialed.clone())?);
        let transport = Arc::new(ReqwestTransport::new(credentialed, anonymous));
        let pending = Arc::new(InMemoryPendingStore::new());
        let location = Arc::new(MemoryLocation::new(start_url));

        let cache: Arc<dyn UserCache> = match &config.storage.user_cache_path {
            Some(path) => Arc::new(FileUserCache::new(path)),
            None => Arc::new(InMemoryUserCache::new()),
        };

        let strategy: Arc<dyn AuthStrategy> = match config.mode {
            AuthMode::Direct => {
                let client = Arc::new(oauth_client(&config)?);
                let mut strategy = DirectStrategy::new(client, pending.clone(), api)
                    .with_logout_policy(config.effective_logout_policy());
                if config.oauth.resolution == CallbackResolution::ExternalLogin {
                    strategy = strategy.with_external_login(config.oauth.external_provider.clone());
                }
                Arc::new(strategy)
            }
            AuthMode::Bff => Arc::new(
                BffStrategy::new(api, pending.clone())
                    .with_status_polling(
                        config.callback.status_check_attempts,
                        config.callback.status_check_delay(),
                    )
                    .with_logout_policy(config.effective_logout_policy()),
            ),
        };

        info!(
            mode = %config.mode,
            logout_policy = %config.effective_logout_policy(),
            api = %config.api.base_url,
            "passage runtime ready"
        );

        let controller = SessionController::new(strategy, cache, location.clone(), transport);
        Ok(Self { config, controller, pending, location })
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn location(&self) -> &Arc<MemoryLocation> {
        &self.location
    }

    pub fn pending(&self) -> &Arc<InMemoryPendingStore> {
        &self.pending
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handler for the callback the location is currently on
    pub fn callback_handler(&self) -> CallbackHandler {
        let pending: Arc<dyn PendingRequestStore> = self.pending.clone();
        CallbackHandler::new(self.controller.clone(), pending, self.location.clone())
            .with_settings(&self.config.callback)
    }
}

fn parse_endpoint(name: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| AuthError::Config(format!("invalid oauth.{name} {raw:?}: {e}")))
}

/// Map the configured endpoints onto the authorization-server client
///
/// # Errors
/// Returns `AuthError::Config` when an endpoint is not an absolute URL.
pub fn oauth_config(settings: &OAuthSettings) -> Result<OAuthConfig> {
    Ok(OAuthConfig {
        authorization_endpoint: parse_endpoint(
            "authorization_endpoint",
            &settings.authorization_endpoint,
        )?,
        token_endpoint: parse_endpoint("token_endpoint", &settings.token_endpoint)?,
        client_id: settings.client_id.clone(),
        client_secret: settings.client_secret.clone(),
        redirect_uri: settings.redirect_uri.clone(),
        scopes: settings.scopes.clone(),
    })
}

fn api_http_client(config: &Config) -> HttpClientBuilder {
    HttpClient::builder()
        .timeout(config.api.request_timeout())
        .max_attempts(usize::try_from(config.api.max_attempts).unwrap_or(1))
        .base_backoff(config.api.retry_backoff())
        .user_agent(USER_AGENT)
}

fn oauth_client(config: &Config) -> Result<OAuthClient> {
    let http = reqwest::Client::builder()
        .timeout(config.api.request_timeout())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AuthError::Config(format!("failed to build token client: {e}")))?;
    Ok(OAuthClient::with_http_client(oauth_config(&config.oauth)?, http))
}
