//! Unverified JWT payload decoding
//!
//! Reads claims from tokens the client already trusts by construction (it
//! just received them from the token endpoint over TLS). Signatures are not
//! checked here; the issuing server stays the source of truth.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Epoch values above this are read as milliseconds rather than seconds
///
/// Issuers disagree on the unit of `exp`; a seconds value only crosses this
/// line in the year 33658.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Errors decoding a JWT payload
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("token payload is not base64url: {0}")]
    Encoding(String),

    #[error("token payload is not valid JSON claims: {0}")]
    Json(String),
}

/// Registered claims used for expiry decisions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisteredClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl RegisteredClaims {
    /// `exp` normalized to epoch seconds
    #[must_use]
    pub fn expires_at_secs(&self) -> Option<i64> {
        self.exp.map(normalize_epoch_seconds)
    }
}

/// Normalize an epoch timestamp that may be in seconds or milliseconds
#[must_use]
pub const fn normalize_epoch_seconds(value: i64) -> i64 {
    if value > EPOCH_MILLIS_THRESHOLD {
        value / 1000
    } else {
        value
    }
}

fn payload_bytes(token: &str) -> Result<Vec<u8>, ClaimsError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts[1].is_empty() {
        return Err(ClaimsError::Malformed);
    }

    // Some issuers pad the segments even though RFC 7515 forbids it.
    let payload = parts[1].trim_end_matches('=');
    URL_SAFE_NO_PAD.decode(payload).map_err(|e| ClaimsError::Encoding(e.to_string()))
}

/// Decode the payload segment into any claims type
///
/// # Errors
/// Returns `ClaimsError` if the token is not a JWT or the payload does not
/// deserialize into `T`.
pub fn decode_claims<T: DeserializeOwned>(token: &str) -> Result<T, ClaimsError> {
    let bytes = payload_bytes(token)?;
    serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Json(e.to_string()))
}

/// Whether the token's `exp` lies before `now`
///
/// Undecodable tokens and tokens without `exp` report `false`: expiry is then
/// left for the server to enforce.
#[must_use]
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims::<RegisteredClaims>(token) {
        Ok(claims) => claims.expires_at_secs().is_some_and(|exp| exp < now.timestamp()),
        Err(_) => false,
    }
}

/// [`is_expired_at`] against the current time
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}
