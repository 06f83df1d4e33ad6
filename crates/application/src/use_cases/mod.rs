//! Application use cases (business logic orchestration).

mod can_i;
mod delete_token;
mod generate_token;
mod get_account;
mod get_user_info;
mod hash_password;
mod list_accounts;
mod update_password;

#[cfg(test)]
mod fakes;

pub use can_i::*;
pub use delete_token::*;
pub use generate_token::*;
pub use get_account::*;
pub use get_user_info::*;
pub use hash_password::*;
pub use list_accounts::*;
pub use update_password::*;
