//! Authorization queries ("can I do X to Y?").

use serde::{Deserialize, Serialize};

use crate::error::{DomainResult, require_non_empty};

/// A validated `(action, resource, sub-resource)` triple.
///
/// The vocabulary is open: values are passed to the server verbatim and only
/// checked for emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    action: String,
    resource: String,
    sub_resource: String,
}

impl AuthorizationRequest {
    /// Builds a request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DomainError::EmptyField`] if any element is empty.
    pub fn new(
        action: impl Into<String>,
        resource: impl Into<String>,
        sub_resource: impl Into<String>,
    ) -> DomainResult<Self> {
        let request = Self {
            action: action.into(),
            resource: resource.into(),
            sub_resource: sub_resource.into(),
        };
        require_non_empty("action", &request.action)?;
        require_non_empty("resource", &request.resource)?;
        require_non_empty("subresource", &request.sub_resource)?;
        Ok(request)
    }

    /// The action, e.g. `sync`.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The resource kind, e.g. `applications`.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The sub-resource, e.g. `default/*`.
    #[must_use]
    pub fn sub_resource(&self) -> &str {
        &self.sub_resource
    }
}

/// The server's answer to an [`AuthorizationRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision(pub bool);

impl AuthorizationDecision {
    /// Returns true if the action is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        self.0
    }

    /// `yes` or `no`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        if self.0 { "yes" } else { "no" }
    }
}
