//! Get account use case

use chrono::{DateTime, Utc};
use acctl_domain::{Account, Token};
use tracing::debug;

use crate::error::ApplicationResult;
use crate::ports::{AccountClient, CallContext, Clock};
use crate::use_cases::resolve_account_name;

/// An account snapshot together with the time it was checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetails {
    /// The account as returned by the server.
    pub account: Account,
    /// Local time used to flag expired tokens.
    pub checked_at: DateTime<Utc>,
}

impl AccountDetails {
    /// Tokens paired with whether they had expired at `checked_at`.
    pub fn tokens(&self) -> impl Iterator<Item = (&Token, bool)> {
        self.account
            .tokens
            .iter()
            .map(|token| (token, token.is_expired(self.checked_at)))
    }
}

/// Fetches one account, defaulting to the caller's own.
pub struct GetAccount<'a, C: ?Sized, K: ?Sized> {
    client: &'a C,
    clock: &'a K,
}

impl<'a, C: AccountClient + ?Sized, K: Clock + ?Sized> GetAccount<'a, C, K> {
    /// Creates a new `GetAccount` use case.
    pub const fn new(client: &'a C, clock: &'a K) -> Self {
        Self { client, clock }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns the remote error, including not-found for unknown accounts.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        account: Option<&str>,
    ) -> ApplicationResult<AccountDetails> {
        let name = resolve_account_name(self.client, ctx, account).await?;
        ctx.ensure_active()?;
        let account = self.client.get_account(ctx, &name).await?;
        debug!(account = %account.name, tokens = account.tokens.len(), "fetched account");
        Ok(AccountDetails {
            account,
            checked_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApplicationError;
    use crate::use_cases::fakes::{Call, FakeServer, server_now};
    use acctl_domain::TokenLifetime;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn server() -> FakeServer {
        let issued = server_now() - Duration::days(2);
        FakeServer::new()
            .with_user("alice", "pw")
            .with_user("ci", "pw")
            .with_token("ci", Token::issue("old", issued, TokenLifetime::Seconds(3600)))
            .with_token("ci", Token::issue("forever", issued, TokenLifetime::Never))
    }

    #[tokio::test]
    async fn test_flags_expired_tokens() {
        let server = server();
        let client = server.client(server.session("alice"));
        let clock = FixedClock(server_now());

        let details = GetAccount::new(&client, &clock)
            .execute(&CallContext::background(), Some("ci"))
            .await
            .unwrap();

        let flags: Vec<_> = details.tokens().map(|(t, expired)| (t.id.as_str(), expired)).collect();
        assert_eq!(flags, vec![("old", true), ("forever", false)]);
    }

    #[tokio::test]
    async fn test_defaults_to_current_user() {
        let server = server();
        let client = server.client(server.session("alice"));
        let clock = FixedClock(server_now());

        let details = GetAccount::new(&client, &clock)
            .execute(&CallContext::background(), None)
            .await
            .unwrap();

        assert_eq!(details.account.name, "alice");
        assert_eq!(
            server.calls(),
            vec![Call::GetUserInfo, Call::GetAccount("alice".into())]
        );
    }

    #[tokio::test]
    async fn test_repeated_reads_are_identical() {
        let server = server();
        let client = server.client(server.session("alice"));
        let clock = FixedClock(server_now());
        let use_case = GetAccount::new(&client, &clock);
        let ctx = CallContext::background();

        let first = use_case.execute(&ctx, Some("ci")).await.unwrap();
        let second = use_case.execute(&ctx, Some("ci")).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_account_is_remote_not_found() {
        let server = server();
        let client = server.client(server.session("alice"));
        let clock = FixedClock(server_now());

        let error = GetAccount::new(&client, &clock)
            .execute(&CallContext::background(), Some("ghost"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApplicationError::Remote(ref e) if e.is_not_found()));
    }
}
