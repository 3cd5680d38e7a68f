//! PKCE (Proof Key for Code Exchange) and CSRF nonce generation
//!
//! Implements RFC 7636 S256 challenges. All randomness comes from the
//! operating system CSPRNG; a failing entropy source is reported as an error
//! rather than replaced with a weaker generator.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Random bytes behind each code verifier (256 bits)
pub const VERIFIER_BYTES: usize = 32;

/// Random bytes behind each CSRF state (256 bits)
pub const STATE_BYTES: usize = 32;

/// Errors from nonce generation
#[derive(Debug, Error)]
pub enum PkceError {
    /// The OS random source could not be read
    #[error("secure random source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}

fn random_token(len: usize) -> Result<String, PkceError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a cryptographically secure code verifier
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43 characters).
/// Per RFC 7636, verifiers must be 43-128 characters long.
///
/// # Errors
/// Returns `PkceError::Entropy` if the OS random source fails
pub fn generate_code_verifier() -> Result<String, PkceError> {
    random_token(VERIFIER_BYTES)
}

/// Derive the S256 code challenge: BASE64URL(SHA256(ASCII(code_verifier)))
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token for CSRF protection
///
/// # Errors
/// Returns `PkceError::Entropy` if the OS random source fails
pub fn generate_state() -> Result<String, PkceError> {
    random_token(STATE_BYTES)
}

/// Compare the stored state with the one received in the callback
///
/// Runs in time independent of where the strings first differ.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (a, b) = (expected.as_bytes(), actual.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// PKCE challenge pair plus CSRF state for one authorization request
#[derive(Clone)]
pub struct PkceChallenge {
    /// Kept secret until token exchange
    pub code_verifier: String,

    /// SHA256 of `code_verifier`, sent in the authorization request
    pub code_challenge: String,

    /// Must match between authorization request and callback
    pub state: String,
}

impl PkceChallenge {
    /// Generate a fresh verifier, challenge, and state
    ///
    /// # Examples
    /// ```
    /// use passage_common::auth::pkce::PkceChallenge;
    ///
    /// let challenge = PkceChallenge::generate().expect("OS random source");
    /// assert_eq!(challenge.code_verifier.len(), 43);
    /// assert_eq!(challenge.challenge_method(), "S256");
    /// ```
    ///
    /// # Errors
    /// Returns `PkceError::Entropy` if the OS random source fails
    pub fn generate() -> Result<Self, PkceError> {
        let code_verifier = generate_code_verifier()?;
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state()?;

        Ok(Self { code_verifier, code_challenge, state })
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub const fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("code_verifier", &"<redacted>")
            .field("code_challenge", &self.code_challenge)
            .field("state", &"<redacted>")
            .finish()
    }
}
