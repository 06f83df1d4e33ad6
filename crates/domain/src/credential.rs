//! Locally cached credentials.
//!
//! A bearer credential is an opaque, claims-bearing token (a JWT). The client
//! never validates its signature; it only reads claims such as the subject to
//! recover the username after a password rotation.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A bearer credential presented on every authenticated remote call.
///
/// `Debug` and `Display` never print the credential itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Wraps a raw credential string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw credential for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no credential is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the unverified claims carried by the credential.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCredential`] if the credential is not a
    /// three-part JWT with a base64url JSON payload.
    pub fn claims(&self) -> DomainResult<BearerClaims> {
        let mut parts = self.0.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => {
                return Err(DomainError::InvalidCredential(
                    "expected three dot-separated segments".to_string(),
                ));
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| DomainError::InvalidCredential(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::InvalidCredential(format!("payload is not valid claims: {e}")))
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential([REDACTED])")
    }
}

impl fmt::Display for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// A password held in memory while a flow runs.
///
/// `Debug` never prints the password itself.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Password(String);

impl Password {
    /// Wraps a password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Wraps a password, treating an empty string as absent.
    #[must_use]
    pub fn non_empty(password: Option<String>) -> Option<Self> {
        password.filter(|p| !p.is_empty()).map(Self)
    }

    /// Returns the plaintext password.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the password is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Claims read from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BearerClaims {
    /// Subject, e.g. `alice` or `alice:login`.
    #[serde(default)]
    pub sub: String,
    /// Issuer.
    #[serde(default)]
    pub iss: String,
    /// Issued-at, seconds since the epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry, seconds since the epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Token id.
    #[serde(default)]
    pub jti: Option<String>,
}

impl BearerClaims {
    /// Username encoded in the subject claim.
    #[must_use]
    pub fn username(&self) -> &str {
        username_from_subject(&self.sub)
    }
}

/// Strips the session-kind suffix from a subject (`alice:login` -> `alice`).
#[must_use]
pub fn username_from_subject(subject: &str) -> &str {
    subject.split(':').next().unwrap_or(subject)
}

/// One named local binding of a user to a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialContext {
    /// Context name.
    pub context_name: String,
    /// Server address the context talks to.
    pub server: String,
    /// Username recovered from the credential's subject claim, empty when the
    /// credential carries no readable claims.
    pub username: String,
    /// The cached bearer credential.
    pub bearer_credential: BearerCredential,
}

impl CredentialContext {
    /// Builds a context, deriving the username from the credential.
    #[must_use]
    pub fn new(
        context_name: impl Into<String>,
        server: impl Into<String>,
        bearer_credential: BearerCredential,
    ) -> Self {
        let username = bearer_credential
            .claims()
            .map(|claims| claims.username().to_string())
            .unwrap_or_default();
        Self {
            context_name: context_name.into(),
            server: server.into(),
            username,
            bearer_credential,
        }
    }

    /// Returns a copy holding a different credential.
    #[must_use]
    pub fn with_credential(&self, bearer_credential: BearerCredential) -> Self {
        Self::new(self.context_name.clone(), self.server.clone(), bearer_credential)
    }

    /// Decodes the claims of the cached credential.
    ///
    /// # Errors
    ///
    /// See [`BearerCredential::claims`].
    pub fn claims(&self) -> DomainResult<BearerClaims> {
        self.bearer_credential.claims()
    }
}

/// Encodes an unsigned JWT carrying the given claims.
///
/// Useful for fakes and fixtures; real credentials come from the remote
/// login endpoint.
#[must_use]
pub fn unsigned_jwt(claims: &BearerClaims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap_or_default());
    format!("{header}.{payload}.")
}
