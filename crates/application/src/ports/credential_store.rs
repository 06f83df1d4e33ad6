//! Local credential store port
//!
//! Defines the interface for the durable record of named contexts.

use async_trait::async_trait;

use acctl_domain::CredentialContext;

/// Errors that can occur during credential store operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    /// No context is marked as current and none was named.
    #[error("no current context; log in first or pass --context")]
    NoCurrentContext,

    /// The named context does not exist.
    #[error("context not found: {0}")]
    ContextNotFound(String),

    /// The context references a server or user entry that does not exist.
    #[error("context '{context}' is incomplete: {reason}")]
    Incomplete {
        /// The context name.
        context: String,
        /// What is missing.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Store of named credential contexts, one of which is current.
///
/// Reads and writes go through `resolve`/`upsert`/`persist`: `upsert` only
/// changes the in-memory record, `persist` makes it durable.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Name of the current context, if any.
    fn current_context(&self) -> Option<String>;

    /// Resolves a context by name, or the current context when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `NoCurrentContext`, `ContextNotFound` or `Incomplete`.
    fn resolve(&self, name: Option<&str>) -> Result<CredentialContext, CredentialStoreError>;

    /// Inserts or replaces the record for `record.context_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be applied.
    fn upsert(&mut self, record: &CredentialContext) -> Result<(), CredentialStoreError>;

    /// Writes the store durably.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    async fn persist(&self) -> Result<(), CredentialStoreError>;
}
