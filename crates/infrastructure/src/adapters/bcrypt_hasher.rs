//! Bcrypt password hasher

use acctl_application::ports::{HashError, PasswordHasher};
use acctl_domain::Password;

/// Cost the server itself uses when it stores a password.
pub const SERVER_COST: u32 = 10;

/// Hashes passwords with bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BcryptHasher {
    /// A hasher using [`SERVER_COST`].
    #[must_use]
    pub const fn new() -> Self {
        Self { cost: SERVER_COST }
    }

    /// A hasher with an explicit cost factor (4 to 31).
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &Password) -> Result<String, HashError> {
        bcrypt::hash(password.expose(), self.cost).map_err(|e| HashError(e.to_string()))
    }
}
