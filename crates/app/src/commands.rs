//! Command dispatch and output.

use std::io::Write;

use tracing::debug;

use acctl_application::{
    AuthorizationQuery, CallContext, DeleteToken, DeleteTokenInput, GenerateToken,
    GenerateTokenInput, GetAccount, GetUserInfo, HashPassword, ListAccounts, Prompt,
    UpdatePassword, UpdatePasswordInput,
};
use acctl_domain::Password;
use acctl_infrastructure::{BcryptHasher, SystemClock, render};

use crate::cli::{Command, GlobalArgs};
use crate::session::Session;

/// Runs one command against an open session, writing results to `out`.
///
/// # Errors
///
/// Returns the use case error, or an error if the result cannot be rendered
/// or written.
pub async fn dispatch(
    command: Command,
    global: &GlobalArgs,
    session: &mut Session,
    ctx: &CallContext,
    prompt: &dyn Prompt,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let client = &session.client;
    match command {
        Command::UpdatePassword {
            account,
            current_password,
            new_password,
        } => {
            let token_mode = global.auth_token().is_some();
            let input = UpdatePasswordInput {
                account,
                current_password: Password::non_empty(current_password),
                new_password: Password::non_empty(new_password),
                context: if token_mode { None } else { global.context.clone() },
                skip_refresh: token_mode,
            };
            let report = UpdatePassword::new(client, prompt)
                .execute(ctx, session.store.as_mut(), input)
                .await?;
            writeln!(out, "Password updated")?;
            if let Some(context) = report.updated_context {
                writeln!(out, "Context '{context}' updated")?;
            } else if report.credential_invalidated {
                writeln!(
                    out,
                    "No local context updated; the token passed with --auth-token is no longer valid, log in again"
                )?;
            }
        }
        Command::GetUserInfo { output } => {
            let identity = GetUserInfo::new(client).execute(ctx).await?;
            write!(out, "{}", render::identity(&identity, output.output)?)?;
        }
        Command::CanI {
            action,
            resource,
            subresource,
        } => {
            let decision = AuthorizationQuery::new(client)
                .execute(ctx, &action, &resource, &subresource)
                .await?;
            write!(out, "{}", render::decision(decision))?;
        }
        Command::List { output } => {
            let accounts = ListAccounts::new(client).execute(ctx).await?;
            write!(out, "{}", render::accounts(&accounts, output.output)?)?;
        }
        Command::Get { account, output } => {
            let details = GetAccount::new(client, &SystemClock::new())
                .execute(ctx, account.as_deref())
                .await?;
            write!(out, "{}", render::account_details(&details, output.output)?)?;
        }
        Command::GenerateToken {
            account,
            expires_in,
            id,
        } => {
            let generated = GenerateToken::new(client)
                .execute(
                    ctx,
                    GenerateTokenInput {
                        account,
                        expires_in,
                        id,
                    },
                )
                .await?;
            writeln!(out, "{}", generated.token.expose())?;
        }
        Command::Bcrypt { password } => return bcrypt(password, prompt, out),
        Command::DeleteToken { id, account } => {
            let outcome = DeleteToken::new(client, prompt)
                .execute(ctx, DeleteTokenInput { account, id })
                .await?;
            if let Some(message) = outcome.message() {
                writeln!(out, "{message}")?;
            }
        }
    }
    out.flush()?;
    debug!("command finished");
    Ok(())
}

/// Prints the bcrypt hash of `password`, prompting for it when absent.
///
/// # Errors
///
/// Returns the use case error, or an error if the hash cannot be written.
pub fn bcrypt(
    password: Option<String>,
    prompt: &dyn Prompt,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let hash = HashPassword::new(&BcryptHasher::new(), prompt)
        .execute(Password::non_empty(password))?;
    writeln!(out, "{hash}")?;
    out.flush()?;
    Ok(())
}
