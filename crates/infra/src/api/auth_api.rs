//! Application auth API / BFF client
//!
//! Implements the `AuthApi` port over the shared [`HttpClient`]. Status codes
//! are mapped here: 401 means "no session" for the read endpoints, 5xx is a
//! transient backend outage, anything else unexpected is permanent.

use async_trait::async_trait;
use passage_core::AuthApi;
use passage_domain::constants::{
    BFF_LOGIN_PATH, CURRENT_USER_PATH, EXTERNAL_LOGIN_PATH, LOGOUT_PATH, PASSWORD_LOGIN_PATH,
    STATUS_PATH,
};
use passage_domain::{
    AuthError, Credentials, ExternalLoginRequest, ExternalLoginResponse, PasswordLoginResponse,
    Result, StatusResponse, UserInfo, UserInfoEnvelope,
};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::{status_error, InfraError};
use crate::http::HttpClient;

/// HTTP implementation of [`AuthApi`]
#[derive(Debug, Clone)]
pub struct AuthApiClient {
    base_url: Url,
    login_url: Url,
    http: HttpClient,
}

impl AuthApiClient {
    /// Create a client rooted at `base_url`
    ///
    /// # Errors
    /// Returns `AuthError::Config` when `base_url` is not an absolute URL.
    pub fn new(base_url: &str, http: HttpClient) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AuthError::Config(format!("invalid api base_url {base_url:?}: {e}")))?;
        let login_url = join(&base_url, BFF_LOGIN_PATH)?;
        Ok(Self { base_url, login_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        join(&self.base_url, path)
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| AuthError::Config(format!("invalid endpoint {path}: {e}")))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(|e| AuthError::from(InfraError::from(e)))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::from(InfraError::from(e)))
}

/// Pull a human-readable message out of an error body, if there is one
async fn error_message(response: Response, context: &str) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body).ok().and_then(|value| {
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    });
    match detail {
        Some(detail) => format!("{context} returned {status}: {detail}"),
        None => format!("{context} returned {status}"),
    }
}

#[async_trait]
impl AuthApi for AuthApiClient {
    fn login_url(&self) -> Url {
        self.login_url.clone()
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<Option<UserInfo>> {
        let url = self.endpoint(CURRENT_USER_PATH)?;
        let response = self.http.send(self.http.request(Method::GET, url)).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                debug!("no session for current user");
                Ok(None)
            }
            status if status.is_success() => {
                let info = decode::<UserInfoEnvelope>(response).await?.into_inner();
                if info.identifier().is_none() {
                    warn!("user-info response carried no identifier");
                    return Ok(None);
                }
                Ok(Some(info))
            }
            status => Err(status_error(status, "user-info endpoint")),
        }
    }

    #[instrument(skip(self))]
    async fn check_status(&self) -> Result<bool> {
        let url = self.endpoint(STATUS_PATH)?;
        let response = self.http.send(self.http.request(Method::GET, url)).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(false),
            status if status.is_success() => {
                Ok(decode::<StatusResponse>(response).await?.authenticated)
            }
            status => Err(status_error(status, "status endpoint")),
        }
    }

    #[instrument(skip(self, bearer), fields(bearer = bearer.is_some()))]
    async fn logout(&self, bearer: Option<&str>) -> Result<()> {
        let url = self.endpoint(LOGOUT_PATH)?;
        let mut builder = self.http.request(Method::POST, url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = self
            .http
            .send(builder)
            .await
            .map_err(|e| AuthError::RevocationFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::RevocationFailed(error_message(response, "logout endpoint").await))
        }
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn password_login(&self, credentials: &Credentials) -> Result<PasswordLoginResponse> {
        let url = self.endpoint(PASSWORD_LOGIN_PATH)?;
        let builder = self.http.request(Method::POST, url).json(credentials);
        let response = self.http.send(builder).await?;

        match response.status() {
            status if status.is_success() => decode(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => {
                Err(AuthError::IdentityProvider(error_message(response, "login endpoint").await))
            }
            status => Err(status_error(status, "login endpoint")),
        }
    }

    #[instrument(skip(self, request), fields(provider = %request.provider))]
    async fn external_login(
        &self,
        request: &ExternalLoginRequest,
    ) -> Result<ExternalLoginResponse> {
        let url = self.endpoint(EXTERNAL_LOGIN_PATH)?;
        let builder = self.http.request(Method::POST, url).json(request);
        let response = self.http.send(builder).await?;

        let status = response.status();
        if status.is_success() {
            decode(response).await
        } else if status.is_client_error() {
            Err(AuthError::TokenExchangeFailed(
                error_message(response, "external-login endpoint").await,
            ))
        } else {
            Err(status_error(status, "external-login endpoint"))
        }
    }
}
