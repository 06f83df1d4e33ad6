//! Local persistence: the config-file credential store and the file system
//! it writes through.

mod file_system;
mod local_config;

pub use file_system::TokioFileSystem;
pub use local_config::{ContextRef, FileCredentialStore, LocalConfig, ServerEntry, UserEntry};
