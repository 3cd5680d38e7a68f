//! Port interfaces for session management
//!
//! These traits define the boundaries between the login state machines and
//! the infrastructure that stores, fetches, and navigates.

use async_trait::async_trait;
use passage_domain::{
    Credentials, ExternalLoginRequest, ExternalLoginResponse, OutgoingRequest,
    PasswordLoginResponse, PendingAuthorization, Result, TransportResponse, UserInfo, UserRecord,
};
use url::Url;

/// Tab-scoped, non-durable store for the in-flight login attempt
///
/// Single writer (`initiate_login`), single reader (the callback).
pub trait PendingRequestStore: Send + Sync {
    /// Replace any previous attempt
    fn save(&self, pending: PendingAuthorization) -> Result<()>;

    /// Remove and return the CSRF state
    fn take_state(&self) -> Option<String>;

    /// PKCE verifier of the current attempt, left in place
    fn code_verifier(&self) -> Option<String>;

    /// Drop the verifier after a successful exchange
    fn discard_verifier(&self);

    /// Forget the attempt entirely
    fn clear(&self);
}

/// Durable copy of the signed-in user, used only to pre-render
pub trait UserCache: Send + Sync {
    /// Last stored user; `Ok(None)` when nothing was cached
    fn load(&self) -> Result<Option<UserRecord>>;

    /// Overwrite the cached user
    fn store(&self, user: &UserRecord) -> Result<()>;

    /// Remove the cached user; clearing an empty cache succeeds
    fn clear(&self) -> Result<()>;
}

/// Application auth API and BFF endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/login` redirect target on the BFF
    fn login_url(&self) -> Url;

    /// `GET /api/auth/user/me`; `Ok(None)` on 401
    async fn current_user(&self) -> Result<Option<UserInfo>>;

    /// `GET /api/auth/status`; `Ok(false)` on 401
    async fn check_status(&self) -> Result<bool>;

    /// `POST /api/auth/logout`, with a bearer token in direct mode
    async fn logout(&self, bearer: Option<&str>) -> Result<()>;

    /// `POST /api/auth/login` with username and password
    async fn password_login(&self, credentials: &Credentials) -> Result<PasswordLoginResponse>;

    /// `POST /api/auth/external-login` with the provider's code and state
    async fn external_login(&self, request: &ExternalLoginRequest)
        -> Result<ExternalLoginResponse>;
}

/// The current page and its navigation primitives
pub trait Location: Send + Sync {
    /// Full URL of the page, query included
    fn current_url(&self) -> Url;

    /// Strip the query string without adding a history entry
    fn clear_query(&self);

    /// Full-page redirect to another origin
    fn redirect(&self, url: &Url);

    /// In-app navigation to a route such as `/dashboard`
    fn navigate(&self, route: &str);
}

/// Sends requests that the session controller has authorized
#[async_trait]
pub trait RequestTransport: Send + Sync {
    /// Send as-is; non-success statuses are returned, not raised
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse>;
}
