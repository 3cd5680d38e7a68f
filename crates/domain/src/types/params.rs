//! Redirect query parameters
//!
//! `/callback?code=..&state=..` from the identity provider and
//! `/dashboard?login=success` from the BFF. Both parse from a full URL or a
//! bare query string. Empty values count as absent.

use url::Url;

use crate::constants::{
    PARAM_CODE, PARAM_ERROR, PARAM_ERROR_DESCRIPTION, PARAM_LOGIN, PARAM_STATE,
};
use crate::errors::{AuthError, Result};
use crate::impl_domain_enum_conversions;

fn query_pairs(input: &str) -> Result<Vec<(String, String)>> {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        let url = Url::parse(trimmed)
            .map_err(|e| AuthError::InvalidResponse(format!("invalid redirect URL: {e}")))?;
        return Ok(pairs_of(&url));
    }

    let query = trimmed.rsplit_once('?').map_or(trimmed, |(_, q)| q);
    Ok(url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
}

fn pairs_of(url: &Url) -> Vec<(String, String)> {
    url.query_pairs().into_owned().collect()
}

fn take(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, v)| k == key && !v.is_empty()).map(|(_, v)| v.clone())
}

/// Parameters the identity provider appends to the redirect URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse from a full URL or a query string
    ///
    /// # Errors
    /// Returns `AuthError::InvalidResponse` if a full URL cannot be parsed.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::from_pairs(&query_pairs(input)?))
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(&pairs_of(url))
    }

    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            code: take(pairs, PARAM_CODE),
            state: take(pairs, PARAM_STATE),
            error: take(pairs, PARAM_ERROR),
            error_description: take(pairs, PARAM_ERROR_DESCRIPTION),
        }
    }

    /// Provider-reported failure, with its description when one was sent
    pub fn provider_error(&self) -> Option<String> {
        self.error.as_ref().map(|error| match &self.error_description {
            Some(description) => format!("{error}: {description}"),
            None => error.clone(),
        })
    }
}

/// `login` value the BFF appends when redirecting back to the landing route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSignal {
    Success,
    Already,
    Failed,
}

impl_domain_enum_conversions!(LoginSignal {
    Success => "success",
    Already => "already",
    Failed => "failed",
});

/// What the landing parameters ask the controller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingOutcome {
    /// Explicit failure, carrying the message to surface
    Failed(String),
    /// Login just completed (`success` or `already`), fetch the user
    LoggedIn,
    /// Nothing signalled, run the silent session check
    Unsignalled,
}

/// Transient parameters on the landing route after a BFF redirect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingParams {
    /// Raw `login` value; unknown values are kept so they still get cleared
    pub login: Option<String>,
    pub error: Option<String>,
}

impl LandingParams {
    /// Parse from a full URL or a query string
    ///
    /// # Errors
    /// Returns `AuthError::InvalidResponse` if a full URL cannot be parsed.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::from_pairs(&query_pairs(input)?))
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(&pairs_of(url))
    }

    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self { login: take(pairs, PARAM_LOGIN), error: take(pairs, PARAM_ERROR) }
    }

    pub fn signal(&self) -> Option<LoginSignal> {
        self.login.as_deref().and_then(|value| value.parse().ok())
    }

    /// Whether anything was consumed that must be stripped from the URL
    pub const fn is_present(&self) -> bool {
        self.login.is_some() || self.error.is_some()
    }

    /// Failure beats success beats the default path
    pub fn outcome(&self, default_failure: &str) -> LandingOutcome {
        let signal = self.signal();
        if let Some(error) = &self.error {
            return LandingOutcome::Failed(error.clone());
        }
        match signal {
            Some(LoginSignal::Failed) => LandingOutcome::Failed(default_failure.to_string()),
            Some(LoginSignal::Success | LoginSignal::Already) => LandingOutcome::LoggedIn,
            None => LandingOutcome::Unsignalled,
        }
    }
}
