//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while validating operator input.
///
/// Every variant is an invalid-argument failure: it is reported before any
/// remote call is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was empty or whitespace.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A duration string could not be parsed.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A duration string parsed to a negative value.
    #[error("duration '{0}' must not be negative")]
    NegativeDuration(String),

    /// An interactively entered password was empty.
    #[error("password must not be empty")]
    EmptyPassword,

    /// The two password entries did not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// A bearer credential could not be decoded into claims.
    #[error("invalid bearer credential: {0}")]
    InvalidCredential(String),

    /// An output format name is not recognised.
    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Rejects empty or whitespace-only values for the named field.
///
/// # Errors
///
/// Returns [`DomainError::EmptyField`] when `value` is blank.
pub fn require_non_empty(field: &'static str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::EmptyField(field));
    }
    Ok(())
}
