//! Hash password use case
//!
//! Produces the hash an administrator pastes into the server's account
//! secret. Runs entirely locally; no session is needed.

use acctl_domain::{DomainError, Password};
use tracing::debug;

use crate::error::ApplicationResult;
use crate::ports::{PasswordHasher, Prompt};

/// Hashes a password given on the command line or read from the terminal.
pub struct HashPassword<'a, H: ?Sized, P: ?Sized> {
    hasher: &'a H,
    prompt: &'a P,
}

impl<'a, H: PasswordHasher + ?Sized, P: Prompt + ?Sized> HashPassword<'a, H, P> {
    /// Creates a new `HashPassword` use case.
    pub const fn new(hasher: &'a H, prompt: &'a P) -> Self {
        Self { hasher, prompt }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty password
    /// - `Prompt` if the password has to be read and cannot be
    /// - `Hash` if the hasher fails
    pub fn execute(&self, password: Option<Password>) -> ApplicationResult<String> {
        let password = match password.filter(|p| !p.is_empty()) {
            Some(password) => password,
            None => self.prompt.read_secret("*** Enter password to hash: ")?,
        };
        if password.is_empty() {
            return Err(DomainError::EmptyPassword.into());
        }
        let hash = self.hasher.hash(&password)?;
        debug!("password hashed");
        Ok(hash)
    }
}
