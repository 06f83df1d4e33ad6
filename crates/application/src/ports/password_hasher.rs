//! Password hashing port

use acctl_domain::Password;

/// Hashing failed inside the hasher.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub String);

/// Port for producing a server-compatible password hash.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns an error if the hasher rejects the input.
    fn hash(&self, password: &Password) -> Result<String, HashError>;
}
