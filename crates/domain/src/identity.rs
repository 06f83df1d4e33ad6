//! The caller's identity as resolved by the remote session endpoint.

use serde::{Deserialize, Serialize};

/// Issuer the remote service stamps on sessions it manages itself.
///
/// Identities from any other issuer are federated and cannot rotate their
/// password through this client.
pub const LOCAL_ISSUER: &str = "argocd";

/// Identity of the currently authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Whether the presented credential maps to a live session.
    #[serde(default)]
    pub logged_in: bool,
    /// Account name of the caller.
    #[serde(default)]
    pub username: String,
    /// Issuer of the caller's session.
    #[serde(default, rename = "iss")]
    pub issuer: String,
    /// Groups the caller belongs to, in server order.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Identity {
    /// Creates a logged-in identity.
    #[must_use]
    pub fn new(username: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            username: username.into(),
            issuer: issuer.into(),
            groups: Vec::new(),
        }
    }

    /// Adds groups to the identity.
    #[must_use]
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the session was issued by the given local issuer.
    #[must_use]
    pub fn is_issued_by(&self, local_issuer: &str) -> bool {
        self.issuer == local_issuer
    }

    /// Returns true if `account` names this identity.
    #[must_use]
    pub fn is_account(&self, account: &str) -> bool {
        self.username == account
    }
}
