//! Remote account and session client port.

use async_trait::async_trait;

use acctl_domain::{
    Account, AuthorizationRequest, BearerCredential, Identity, Password, TokenLifetime,
};

use super::call_context::{CallContext, Interrupted};

/// Errors reported by the remote account and session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("{message} (status {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Cause reported by the server.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The call was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The call did not complete before its deadline.
    #[error("request timed out")]
    Timeout,
}

impl RemoteError {
    /// Builds a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status reported by the server, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the server rejected the presented credential.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Returns true if the server reported that the target does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<Interrupted> for RemoteError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => Self::Cancelled,
            Interrupted::TimedOut => Self::Timeout,
        }
    }
}

/// Parameters of a token creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTokenRequest {
    /// Account the token is issued for.
    pub account: String,
    /// Lifetime of the token.
    pub expires_in: TokenLifetime,
    /// Token id.
    pub id: String,
}

/// Parameters of a password update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePasswordRequest {
    /// Account whose password changes.
    pub account: String,
    /// Password of the calling user, when the server requires it.
    pub current_password: Option<Password>,
    /// The new password.
    pub new_password: Password,
}

/// Port for the remote account, session and authorization endpoints.
///
/// Every call is single-shot: adapters do not retry. Failures carry the
/// remote-reported cause.
#[async_trait]
pub trait AccountClient: Send + Sync {
    /// Resolves the identity behind the presented credential.
    async fn get_user_info(&self, ctx: &CallContext) -> Result<Identity, RemoteError>;

    /// Asks whether the caller may perform the action.
    async fn can_i(
        &self,
        ctx: &CallContext,
        request: &AuthorizationRequest,
    ) -> Result<bool, RemoteError>;

    /// Lists every account visible to the caller.
    async fn list_accounts(&self, ctx: &CallContext) -> Result<Vec<Account>, RemoteError>;

    /// Fetches a single account.
    async fn get_account(&self, ctx: &CallContext, name: &str) -> Result<Account, RemoteError>;

    /// Issues a token and returns the token string.
    async fn create_token(
        &self,
        ctx: &CallContext,
        request: &CreateTokenRequest,
    ) -> Result<String, RemoteError>;

    /// Revokes a token.
    async fn delete_token(
        &self,
        ctx: &CallContext,
        account: &str,
        id: &str,
    ) -> Result<(), RemoteError>;

    /// Changes an account's password.
    async fn update_password(
        &self,
        ctx: &CallContext,
        request: &UpdatePasswordRequest,
    ) -> Result<(), RemoteError>;

    /// Logs in with a username and password, returning a fresh credential.
    async fn password_login(
        &self,
        ctx: &CallContext,
        username: &str,
        password: &Password,
    ) -> Result<BearerCredential, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = RemoteError::status(404, "account 'ghost' not found");
        assert_eq!(error.to_string(), "account 'ghost' not found (status 404)");
        assert!(error.is_not_found());
        assert!(!error.is_unauthenticated());
    }

    #[test]
    fn test_interruptions_map_to_remote_errors() {
        assert_eq!(RemoteError::from(Interrupted::Cancelled), RemoteError::Cancelled);
        assert_eq!(RemoteError::from(Interrupted::TimedOut), RemoteError::Timeout);
    }
}
