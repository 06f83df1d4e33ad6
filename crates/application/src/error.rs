//! Application error types

use std::fmt;

use thiserror::Error;
use acctl_domain::DomainError;

use crate::ports::{CredentialStoreError, HashError, Interrupted, PromptError, RemoteError};

/// Step of the post-rotation refresh that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    /// Reading the local context to recover the username.
    ResolveContext,
    /// Logging in again with the new password.
    Relogin,
    /// Writing the fresh credential to the local store.
    Write,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResolveContext => "reading the local context",
            Self::Relogin => "logging in with the new password",
            Self::Write => "saving the new credential",
        })
    }
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Operator input was rejected before any remote call.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] DomainError),

    /// A remote call failed.
    #[error("{0}")]
    Remote(RemoteError),

    /// The server accepted a password change but the local credential could
    /// not be refreshed. The stored credential is now invalid.
    #[error(
        "password for '{account}' was changed on the server, but {stage} for context \
         '{context}' failed: {reason}. The stored credential is no longer valid; \
         log in again to re-authenticate"
    )]
    Persistence {
        /// Account whose password changed.
        account: String,
        /// Local context left stale.
        context: String,
        /// Which refresh step failed.
        stage: RefreshStage,
        /// Underlying cause.
        reason: String,
    },

    /// The local credential store could not be read or written.
    #[error("credential store error: {0}")]
    Store(#[from] CredentialStoreError),

    /// Interactive input failed.
    #[error("prompt failed: {0}")]
    Prompt(PromptError),

    /// A password could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation timed out.
    #[error("operation timed out")]
    Timeout,
}

impl From<RemoteError> for ApplicationError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Cancelled => Self::Cancelled,
            RemoteError::Timeout => Self::Timeout,
            other => Self::Remote(other),
        }
    }
}

impl From<PromptError> for ApplicationError {
    fn from(error: PromptError) -> Self {
        match error {
            PromptError::Invalid(domain) => Self::InvalidArgument(domain),
            PromptError::Aborted => Self::Cancelled,
            other => Self::Prompt(other),
        }
    }
}

impl From<Interrupted> for ApplicationError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => Self::Cancelled,
            Interrupted::TimedOut => Self::Timeout,
        }
    }
}

/// Coarse classification used to pick a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was sent.
    InvalidArgument,
    /// The server refused or could not be reached.
    Remote,
    /// The server changed state but the local credential is stale.
    Persistence,
    /// Local store or terminal failure.
    Local,
    /// Cancelled or timed out.
    Interrupted,
}

impl ApplicationError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Store(_) | Self::Prompt(_) | Self::Hash(_) => ErrorKind::Local,
            Self::Cancelled | Self::Timeout => ErrorKind::Interrupted,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
