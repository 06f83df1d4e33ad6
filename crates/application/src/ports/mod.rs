//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod account_client;
mod call_context;
mod clock;
mod credential_store;
mod file_system;
mod password_hasher;
mod prompt;

pub use account_client::{AccountClient, CreateTokenRequest, RemoteError, UpdatePasswordRequest};
pub use call_context::{CallContext, CancellationReceiver, CancellationToken, Interrupted};
pub use clock::Clock;
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use file_system::{FileSystem, FileSystemError};
pub use password_hasher::{HashError, PasswordHasher};
pub use prompt::{Prompt, PromptError};
