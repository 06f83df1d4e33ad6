//! Adapters for the remote service, the terminal, password hashing and the clock.

mod bcrypt_hasher;
mod http_account_client;
mod system_clock;
mod terminal_prompt;

pub use bcrypt_hasher::{BcryptHasher, SERVER_COST};
pub use http_account_client::{HttpAccountClient, ServerConnection};
pub use system_clock::SystemClock;
pub use terminal_prompt::TerminalPrompt;
