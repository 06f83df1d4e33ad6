//! acctl Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus result rendering.

pub mod adapters;
pub mod persistence;
pub mod render;
pub mod serialization;

pub use adapters::{BcryptHasher, HttpAccountClient, ServerConnection, SystemClock, TerminalPrompt};
pub use persistence::{FileCredentialStore, LocalConfig, TokioFileSystem};
pub use serialization::{SerializationError, from_yaml_bytes, to_json_stable, to_yaml};
