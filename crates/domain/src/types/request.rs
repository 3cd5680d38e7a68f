//! Transport-neutral request and response types
//!
//! The session controller decorates an [`OutgoingRequest`] with session
//! material and hands it to a transport port; core never touches HTTP
//! directly.

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::errors::{AuthError, Result};
use crate::impl_domain_enum_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl_domain_enum_conversions!(HttpMethod {
    Get => "get",
    Post => "post",
    Put => "put",
    Patch => "patch",
    Delete => "delete",
});

/// A request the application wants to send on behalf of the user
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Send cookies (BFF session transport)
    pub with_credentials: bool,
}

impl OutgoingRequest {
    pub const fn new(method: HttpMethod, url: Url) -> Self {
        Self { method, url, headers: Vec::new(), body: None, with_credentials: false }
    }

    pub const fn get(url: Url) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub const fn post(url: Url) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header, replacing any existing value (names compare
    /// case-insensitively)
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    #[must_use]
    pub fn credentialed(mut self) -> Self {
        self.with_credentials = true;
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response returned by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// Returns `AuthError::InvalidResponse` if the body is not valid JSON for
    /// `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}
