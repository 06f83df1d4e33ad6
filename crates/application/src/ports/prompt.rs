//! Interactive prompt port.

use acctl_domain::{DomainError, Password};

/// Errors raised while prompting the operator.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is required but no interactive terminal is attached.
    #[error("input required but no terminal is attached")]
    NotInteractive,

    /// The operator aborted the prompt (Ctrl-C / Ctrl-D).
    #[error("input aborted")]
    Aborted,

    /// The entered value is invalid.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Port for interactive input.
///
/// Isolates terminal handling so flows stay deterministic under scripted
/// input.
pub trait Prompt: Send + Sync {
    /// Asks a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn confirm(&self, prompt: &str) -> Result<bool, PromptError>;

    /// Reads a value without echoing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn read_secret(&self, prompt: &str) -> Result<Password, PromptError>;

    /// Reads a new password twice and checks that both entries match.
    ///
    /// # Errors
    ///
    /// Returns `Invalid(EmptyPassword)` or `Invalid(PasswordMismatch)` for
    /// bad entries, or an I/O error.
    fn read_and_confirm_secret(&self, account_label: &str) -> Result<Password, PromptError> {
        let password = self.read_secret(&format!("*** Enter new password for user {account_label}: "))?;
        if password.is_empty() {
            return Err(DomainError::EmptyPassword.into());
        }
        let confirmation =
            self.read_secret(&format!("*** Confirm new password for user {account_label}: "))?;
        if password != confirmation {
            return Err(DomainError::PasswordMismatch.into());
        }
        Ok(password)
    }
}
