//! List accounts use case

use acctl_domain::Account;
use tracing::debug;

use crate::error::ApplicationResult;
use crate::ports::{AccountClient, CallContext};

/// Lists the accounts visible to the caller.
pub struct ListAccounts<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: AccountClient + ?Sized> ListAccounts<'a, C> {
    /// Creates a new `ListAccounts` use case.
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns the remote error.
    pub async fn execute(&self, ctx: &CallContext) -> ApplicationResult<Vec<Account>> {
        let accounts = self.client.list_accounts(ctx).await?;
        debug!(count = accounts.len(), "listed accounts");
        Ok(accounts)
    }
}
