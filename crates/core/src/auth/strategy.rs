//! Login strategy seam
//!
//! The session controller and callback handler are written once against
//! [`AuthStrategy`]; the direct PKCE flow and the BFF flow plug in here.

use async_trait::async_trait;
use passage_common::auth::TokenManagerError;
use passage_domain::{
    AuthError, AuthMode, AuthSession, Credentials, LogoutPolicy, OutgoingRequest, Result,
    UserRecord,
};
use url::Url;

/// One way of obtaining and holding a session
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn mode(&self) -> AuthMode;

    fn logout_policy(&self) -> LogoutPolicy;

    /// Record a pending attempt and return the URL to redirect to
    async fn initiate_login(&self) -> Result<Url>;

    /// Turn a validated callback into a signed-in user
    ///
    /// `state` has already been checked against the pending store.
    async fn resolve_callback(&self, code: &str, state: &str) -> Result<UserRecord>;

    /// Fetch the user for a session the server has just reported
    async fn fetch_user(&self) -> Result<Option<UserRecord>>;

    /// Rebuild the session on page load when no landing signal is present
    async fn restore_session(&self) -> Result<Option<UserRecord>>;

    /// Ask the server to end the session
    async fn revoke_session(&self) -> Result<()>;

    /// Whether `session` is backed by credentials this strategy can present
    async fn has_session_material(&self, session: &AuthSession) -> bool;

    /// Attach credentials to an outgoing request
    async fn authorize(&self, request: OutgoingRequest) -> Result<OutgoingRequest>;

    /// Drop locally held credentials and any pending attempt
    async fn discard_local_session(&self);

    /// Sign in with username and password
    async fn password_login(&self, credentials: &Credentials) -> Result<UserRecord>;
}

/// Map token manager failures onto the shared error taxonomy
pub(crate) fn token_error(err: TokenManagerError) -> AuthError {
    match err {
        TokenManagerError::NotAuthenticated => AuthError::Unauthenticated,
        TokenManagerError::NoRefreshToken => AuthError::NoRefreshToken,
        TokenManagerError::RefreshFailed(message) => AuthError::RefreshFailed(message),
        TokenManagerError::OAuthError(err) => AuthError::RefreshFailed(err.to_string()),
    }
}

/// Normalize a logout failure to `RevocationFailed`
pub(crate) fn revocation_error(err: AuthError) -> AuthError {
    match err {
        AuthError::RevocationFailed(_) => err,
        other => AuthError::RevocationFailed(other.to_string()),
    }
}
