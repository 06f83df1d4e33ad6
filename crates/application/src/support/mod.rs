//! In-memory implementations of the local ports.
//!
//! Used for ephemeral sessions (a credential passed on the command line) and
//! for driving flows from scripted input.

mod memory_store;
mod scripted_prompt;

pub use memory_store::InMemoryCredentialStore;
pub use scripted_prompt::ScriptedPrompt;
