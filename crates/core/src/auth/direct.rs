//! Direct Authorization Code + PKCE strategy
//!
//! Tokens live in memory inside a [`TokenManager`]; the user record is built
//! from the identity token's claims. With [`CallbackResolution::ExternalLogin`]
//! the code is handed to the application API instead of the token endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use passage_common::auth::{
    decode_claims, OAuthClientTrait, PkceChallenge, TokenManager, TokenSet,
};
use passage_domain::constants::{DEFAULT_EXTERNAL_PROVIDER, PROVIDER_LOCAL, PROVIDER_OAUTH2};
use passage_domain::{
    AuthError, AuthMode, AuthSession, CallbackResolution, Credentials, ExternalLoginRequest,
    LoginMethod, LogoutPolicy, OutgoingRequest, PendingAuthorization, Result, UserInfo,
    UserRecord,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::ports::{AuthApi, PendingRequestStore};
use super::strategy::{revocation_error, token_error, AuthStrategy};

/// Browser-held tokens obtained with PKCE
pub struct DirectStrategy<C: OAuthClientTrait + 'static> {
    tokens: TokenManager<C>,
    pending: Arc<dyn PendingRequestStore>,
    api: Arc<dyn AuthApi>,
    resolution: CallbackResolution,
    external_provider: String,
    logout_policy: LogoutPolicy,
}

impl<C: OAuthClientTrait + 'static> DirectStrategy<C> {
    pub fn new(
        client: Arc<C>,
        pending: Arc<dyn PendingRequestStore>,
        api: Arc<dyn AuthApi>,
    ) -> Self {
        Self {
            tokens: TokenManager::new(client),
            pending,
            api,
            resolution: CallbackResolution::TokenExchange,
            external_provider: DEFAULT_EXTERNAL_PROVIDER.to_string(),
            logout_policy: LogoutPolicy::default_for(AuthMode::Direct),
        }
    }

    /// Resolve callbacks through the application's external-login endpoint
    #[must_use]
    pub fn with_external_login(mut self, provider: impl Into<String>) -> Self {
        self.resolution = CallbackResolution::ExternalLogin;
        self.external_provider = provider.into();
        self
    }

    #[must_use]
    pub fn with_logout_policy(mut self, policy: LogoutPolicy) -> Self {
        self.logout_policy = policy;
        self
    }

    pub fn token_manager(&self) -> &TokenManager<C> {
        &self.tokens
    }

    /// Exchange the authorization code using the stored verifier
    ///
    /// The verifier is discarded only after the tokens are stored, so a
    /// second exchange for the same attempt fails with `MissingVerifier`.
    #[instrument(skip_all)]
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenSet> {
        let verifier = self.pending.code_verifier().ok_or(AuthError::MissingVerifier)?;

        let tokens = self
            .tokens
            .client()
            .exchange_code(code, &verifier)
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        self.tokens.store_tokens(tokens.clone()).await;
        self.pending.discard_verifier();
        info!("authorization code exchanged");
        Ok(tokens)
    }

    /// Refresh the held tokens, clearing them on failure
    pub async fn refresh_access_token(&self) -> Result<TokenSet> {
        self.tokens.refresh_tokens().await.map_err(token_error)
    }

    pub async fn is_token_expired(&self) -> bool {
        self.tokens.is_expired().await
    }

    async fn resolve_external(&self, code: &str, state: &str) -> Result<UserRecord> {
        let request = ExternalLoginRequest {
            code: code.to_string(),
            state: state.to_string(),
            provider: self.external_provider.clone(),
        };
        let response = self.api.external_login(&request).await?;
        self.pending.discard_verifier();

        let mut user = response.user.into_user(LoginMethod::External, &self.external_provider)?;
        if let Some(access_token) = response.access_token {
            let tokens = TokenSet::new(
                access_token,
                response.refresh_token,
                None,
                response.expires_in.unwrap_or(0),
                None,
            );
            user = user
                .with_token_expiry(tokens.access_expires_at_secs(), tokens.refresh_expires_at_secs());
            self.tokens.store_tokens(tokens).await;
        }
        Ok(user)
    }
}

/// Build the user record from the identity token's claims
pub(crate) fn user_from_tokens(tokens: &TokenSet) -> Result<UserRecord> {
    let info: UserInfo = decode_claims(tokens.identity_token())
        .map_err(|e| AuthError::InvalidResponse(format!("token claims: {e}")))?;

    Ok(info
        .into_user(LoginMethod::OAuth2, PROVIDER_OAUTH2)?
        .with_token_expiry(tokens.access_expires_at_secs(), tokens.refresh_expires_at_secs()))
}

#[async_trait]
impl<C: OAuthClientTrait + 'static> AuthStrategy for DirectStrategy<C> {
    fn mode(&self) -> AuthMode {
        AuthMode::Direct
    }

    fn logout_policy(&self) -> LogoutPolicy {
        self.logout_policy
    }

    async fn initiate_login(&self) -> Result<Url> {
        let challenge = PkceChallenge::generate().map_err(|e| AuthError::Internal(e.to_string()))?;

        self.pending.save(PendingAuthorization {
            state: challenge.state.clone(),
            code_verifier: Some(challenge.code_verifier.clone()),
        })?;

        debug!("pending authorization recorded");
        Ok(self.tokens.client().authorization_url(&challenge))
    }

    async fn resolve_callback(&self, code: &str, state: &str) -> Result<UserRecord> {
        match self.resolution {
            CallbackResolution::TokenExchange => {
                let tokens = self.exchange_code_for_token(code).await?;
                user_from_tokens(&tokens)
            }
            CallbackResolution::ExternalLogin => self.resolve_external(code, state).await,
        }
    }

    async fn fetch_user(&self) -> Result<Option<UserRecord>> {
        self.restore_session().await
    }

    async fn restore_session(&self) -> Result<Option<UserRecord>> {
        if !self.tokens.is_authenticated().await {
            return Ok(None);
        }

        if self.tokens.is_expired().await {
            if let Err(err) = self.tokens.refresh_tokens().await {
                debug!(error = %err, "stored tokens could not be refreshed");
                return Ok(None);
            }
        }

        let Some(tokens) = self.tokens.get_tokens().await else {
            return Ok(None);
        };

        match user_from_tokens(&tokens) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(error = %err, "held tokens carry no usable identity");
                Ok(None)
            }
        }
    }

    async fn revoke_session(&self) -> Result<()> {
        let Some(access_token) = self.tokens.access_token().await else {
            return Ok(());
        };

        self.api.logout(Some(&access_token)).await.map_err(revocation_error)
    }

    async fn has_session_material(&self, _session: &AuthSession) -> bool {
        self.tokens.is_authenticated().await
    }

    async fn authorize(&self, request: OutgoingRequest) -> Result<OutgoingRequest> {
        let access_token = self.tokens.get_access_token().await.map_err(token_error)?;
        Ok(request.bearer(&access_token))
    }

    async fn discard_local_session(&self) {
        self.tokens.clear_tokens().await;
        self.pending.clear();
    }

    async fn password_login(&self, credentials: &Credentials) -> Result<UserRecord> {
        let response = self.api.password_login(credentials).await?;

        let tokens = TokenSet::new(
            response.access_token,
            response.refresh_token,
            None,
            response.expires_in.unwrap_or(0),
            None,
        );
        let user = response
            .user
            .into_user(LoginMethod::Password, PROVIDER_LOCAL)?
            .with_token_expiry(tokens.access_expires_at_secs(), tokens.refresh_expires_at_secs());

        self.tokens.store_tokens(tokens).await;
        info!(user_id = %user.id, "password login succeeded");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the direct strategy.

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::json;

    use super::*;

    fn jwt(claims: serde_json::Value) -> String {
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(claims.to_string()))
    }

    /// Validates the claims-to-user scenario.
    ///
    /// Assertions:
    /// - The id token is preferred over the access token
    /// - Missing name falls back to the default
    /// - Token expiry is copied onto the record
    #[test]
    fn test_user_from_tokens_prefers_id_token() {
        let tokens = TokenSet::new(
            jwt(json!({ "sub": "access-subject", "exp": 1_900_000_000 })),
            None,
            Some(jwt(json!({ "sub": "u1", "email": "kim@example.com" }))),
            0,
            None,
        );

        let user = user_from_tokens(&tokens).unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "User");
        assert_eq!(user.email, "kim@example.com");
        assert_eq!(user.login_method, LoginMethod::OAuth2);
        assert_eq!(user.provider, "oauth2");
        assert_eq!(user.token_expires_at, Some(1_900_000_000));
    }

    /// Validates the opaque token scenario.
    ///
    /// Assertions:
    /// - A token without JWT claims is reported as an invalid response
    #[test]
    fn test_user_from_opaque_token_fails() {
        let tokens = TokenSet::new("opaque".into(), None, None, 3600, None);

        assert!(matches!(user_from_tokens(&tokens), Err(AuthError::InvalidResponse(_))));
    }
}
