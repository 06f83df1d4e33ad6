//! acctl Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the remote account service, the local credential
//!   store, interactive prompts, password hashing and the clock
//! - Use case orchestration (authorization query, token lifecycle,
//!   password rotation)
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod support;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult, ErrorKind, RefreshStage};
pub use ports::{
    AccountClient, CallContext, CancellationReceiver, CancellationToken, Clock, CredentialStore,
    CredentialStoreError, HashError, PasswordHasher, Prompt, PromptError, RemoteError,
};
pub use support::{InMemoryCredentialStore, ScriptedPrompt};
pub use use_cases::{
    AccountDetails, AuthorizationQuery, DeleteToken, DeleteTokenInput, DeleteTokenOutcome,
    GenerateToken, GenerateTokenInput, GenerateTokenOutput, GetAccount, GetUserInfo, HashPassword, ListAccounts,
    Rotation, RotationReport, RotationState, UpdatePassword, UpdatePasswordInput,
    resolve_account_name,
};
