//! Conversions from external infrastructure errors into domain errors.

use passage_domain::AuthError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AuthError);

impl From<InfraError> for AuthError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AuthError> for InfraError {
    fn from(value: AuthError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAuthError {
    fn into_auth(self) -> AuthError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AuthError */
/* -------------------------------------------------------------------------- */

impl IntoAuthError for HttpError {
    fn into_auth(self) -> AuthError {
        if self.is_builder() {
            return AuthError::Config(format!("invalid HTTP request: {self}"));
        }
        if self.is_decode() {
            return AuthError::InvalidResponse(self.to_string());
        }
        if self.is_timeout() {
            return AuthError::backend_transient(format!("request timed out: {self}"));
        }
        if self.is_connect() {
            return AuthError::backend_transient(format!("connection failed: {self}"));
        }
        match self.status() {
            Some(status) => status_error(status, "request"),
            None => AuthError::backend_transient(self.to_string()),
        }
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_auth())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error / serde_json::Error → AuthError */
/* -------------------------------------------------------------------------- */

impl IntoAuthError for std::io::Error {
    fn into_auth(self) -> AuthError {
        AuthError::Storage(format!("{:?}: {}", self.kind(), self))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_auth())
    }
}

impl IntoAuthError for serde_json::Error {
    fn into_auth(self) -> AuthError {
        if self.is_io() {
            AuthError::Storage(self.to_string())
        } else {
            AuthError::InvalidResponse(format!("malformed JSON: {self}"))
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_auth())
    }
}

/* -------------------------------------------------------------------------- */
/* HTTP status → AuthError */
/* -------------------------------------------------------------------------- */

/// Classify a non-success status from the BFF or application API
///
/// 5xx (and 408/429) may clear up on retry; everything else will not.
pub fn status_error(status: StatusCode, context: &str) -> AuthError {
    let message = format!("{context} returned {status}");
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        AuthError::backend_transient(message)
    } else {
        AuthError::backend_permanent(message)
    }
}
