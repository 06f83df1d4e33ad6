//! acctl - command-line client for remote account management
//!
//! Wires the clap command line to the application use cases: opens the
//! local credential store, builds the HTTP client for the selected context,
//! runs one command and maps failures to exit codes. `bcrypt` runs without
//! a session.

pub mod cli;
pub mod config;
pub mod logging;

mod commands;
mod session;

use std::io::Write;

use acctl_application::{ApplicationError, CancellationReceiver, ErrorKind, Prompt};
use acctl_domain::DomainError;

use session::Session;

pub use cli::{Cli, Command, GlobalArgs, OutputArgs};

/// Exit status for a declined confirmation or success.
pub const EXIT_OK: u8 = 0;
/// Exit status for remote and local failures.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for rejected input.
pub const EXIT_INVALID_ARGUMENT: u8 = 2;
/// Exit status when the password changed but the local credential is stale.
pub const EXIT_STALE_CREDENTIAL: u8 = 3;
/// Exit status after Ctrl-C or a timeout.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Runs one parsed command line.
///
/// Results are written to `out`; questions and secrets go through `prompt`.
/// Cancelling the sender paired with `cancel` stops the command before its
/// next step.
///
/// # Errors
///
/// Returns the first failure. Use [`exit_code`] to classify it.
pub async fn run(
    cli: Cli,
    prompt: &dyn Prompt,
    out: &mut dyn Write,
    cancel: CancellationReceiver,
) -> anyhow::Result<()> {
    if let Command::Bcrypt { password } = cli.command {
        return commands::bcrypt(password, prompt, out);
    }
    let mut session = Session::open(&cli.global).await?;
    let ctx = cli.global.call_context(cancel);
    commands::dispatch(cli.command, &cli.global, &mut session, &ctx, prompt, out).await
}

/// Maps an error returned by [`run`] to a process exit status.
#[must_use]
pub fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(error) = error.downcast_ref::<ApplicationError>() {
        return match error.kind() {
            ErrorKind::InvalidArgument => EXIT_INVALID_ARGUMENT,
            ErrorKind::Remote | ErrorKind::Local => EXIT_FAILURE,
            ErrorKind::Persistence => EXIT_STALE_CREDENTIAL,
            ErrorKind::Interrupted => EXIT_INTERRUPTED,
        };
    }
    if error.downcast_ref::<DomainError>().is_some() {
        return EXIT_INVALID_ARGUMENT;
    }
    EXIT_FAILURE
}
