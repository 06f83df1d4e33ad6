//! Delete token use case

use acctl_domain::require_non_empty;
use tracing::{info, warn};

use crate::error::ApplicationResult;
use crate::ports::{AccountClient, CallContext, Prompt};
use crate::use_cases::resolve_account_name;

/// Input for token deletion.
#[derive(Debug, Clone, Default)]
pub struct DeleteTokenInput {
    /// Account owning the token; defaults to the caller.
    pub account: Option<String>,
    /// Id of the token to revoke.
    pub id: String,
}

/// How a deletion request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTokenOutcome {
    /// The token was revoked.
    Deleted {
        /// Owning account.
        account: String,
        /// Revoked token id.
        id: String,
    },
    /// The operator declined; nothing was sent.
    Cancelled {
        /// Token id that was kept.
        id: String,
    },
}

impl DeleteTokenOutcome {
    /// Message shown to the operator, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Deleted { .. } => None,
            Self::Cancelled { id } => Some(format!("The command to delete '{id}' was cancelled.")),
        }
    }
}

/// Revokes a token after affirmative confirmation.
pub struct DeleteToken<'a, C: ?Sized, P: ?Sized> {
    client: &'a C,
    prompt: &'a P,
}

impl<'a, C: AccountClient + ?Sized, P: Prompt + ?Sized> DeleteToken<'a, C, P> {
    /// Creates a new `DeleteToken` use case.
    pub const fn new(client: &'a C, prompt: &'a P) -> Self {
        Self { client, prompt }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an empty id, a prompt error, or the
    /// remote error (including not-found for unknown ids). A declined
    /// confirmation is not an error.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        input: DeleteTokenInput,
    ) -> ApplicationResult<DeleteTokenOutcome> {
        require_non_empty("id", &input.id)?;
        let account = resolve_account_name(self.client, ctx, input.account.as_deref()).await?;

        let question = format!("Are you sure you want to delete '{}' token? [y/n]", input.id);
        if !self.prompt.confirm(&question)? {
            warn!(account = %account, id = %input.id, "token deletion declined");
            return Ok(DeleteTokenOutcome::Cancelled { id: input.id });
        }

        ctx.ensure_active()?;
        self.client.delete_token(ctx, &account, &input.id).await?;
        info!(account = %account, id = %input.id, "token deleted");
        Ok(DeleteTokenOutcome::Deleted {
            account,
            id: input.id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApplicationError;
    use crate::support::ScriptedPrompt;
    use crate::use_cases::fakes::{Call, FakeServer, server_now};
    use acctl_domain::{DomainError, Token, TokenLifetime};
    use pretty_assertions::assert_eq;

    fn server() -> FakeServer {
        FakeServer::new()
            .with_user("ci", "pw")
            .with_token("ci", Token::issue("build-1", server_now(), TokenLifetime::Never))
    }

    fn input(id: &str) -> DeleteTokenInput {
        DeleteTokenInput {
            account: Some("ci".to_string()),
            id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_confirmed_deletion_issues_one_call() {
        let server = server();
        let client = server.client(server.session("ci"));
        let prompt = ScriptedPrompt::new().with_confirmations([true]);

        let outcome = DeleteToken::new(&client, &prompt)
            .execute(&CallContext::background(), input("build-1"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DeleteTokenOutcome::Deleted {
                account: "ci".into(),
                id: "build-1".into()
            }
        );
        assert_eq!(
            server.calls(),
            vec![Call::DeleteToken {
                account: "ci".into(),
                id: "build-1".into()
            }]
        );
        assert_eq!(
            prompt.asked(),
            vec!["Are you sure you want to delete 'build-1' token? [y/n]"]
        );
        assert!(!server.account("ci").has_token("build-1"));
    }

    #[tokio::test]
    async fn test_declined_deletion_is_a_cancelled_no_op() {
        let server = server();
        let client = server.client(server.session("ci"));
        let prompt = ScriptedPrompt::new().with_confirmations([false]);

        let outcome = DeleteToken::new(&client, &prompt)
            .execute(&CallContext::background(), input("build-1"))
            .await
            .unwrap();

        assert_eq!(
            outcome.message().as_deref(),
            Some("The command to delete 'build-1' was cancelled.")
        );
        assert!(server.calls().is_empty());
        assert!(server.account("ci").has_token("build-1"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_remote_error() {
        let server = server();
        let client = server.client(server.session("ci"));
        let prompt = ScriptedPrompt::new().with_confirmations([true]);

        let error = DeleteToken::new(&client, &prompt)
            .execute(&CallContext::background(), input("nope"))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "token with id 'nope' not found (status 404)");
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected_without_prompting() {
        let server = server();
        let client = server.client(server.session("ci"));
        let prompt = ScriptedPrompt::new();

        let error = DeleteToken::new(&client, &prompt)
            .execute(&CallContext::background(), input(""))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ApplicationError::InvalidArgument(DomainError::EmptyField("id"))
        ));
        assert!(prompt.asked().is_empty());
        assert!(server.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_after_confirmation_sends_nothing() {
        let server = server();
        let client = server.client(server.session("ci"));
        let prompt = ScriptedPrompt::new().with_confirmations([true]);
        let (token, receiver) = crate::CancellationToken::new();
        token.cancel();

        let error = DeleteToken::new(&client, &prompt)
            .execute(&CallContext::with_cancellation(receiver), input("build-1"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApplicationError::Cancelled));
        assert!(server.calls().is_empty());
    }
}
