//! acctl Domain - Core account and credential types
//!
//! This crate defines the domain model for the acctl client.
//! All types here are pure Rust with no I/O dependencies.

pub mod account;
pub mod authorization;
pub mod credential;
pub mod duration;
pub mod error;
pub mod id;
pub mod identity;
pub mod output;

pub use account::{Account, Token};
pub use authorization::{AuthorizationDecision, AuthorizationRequest};
pub use credential::{
    BearerClaims, BearerCredential, CredentialContext, Password, unsigned_jwt, username_from_subject,
};
pub use duration::{TokenLifetime, parse_duration};
pub use error::{DomainError, DomainResult, require_non_empty};
pub use id::{generate_token_id, token_id_or_generate};
pub use identity::{Identity, LOCAL_ISSUER};
pub use output::OutputFormat;
