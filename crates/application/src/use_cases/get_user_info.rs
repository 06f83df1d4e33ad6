//! Get user info use case

use acctl_domain::Identity;
use tracing::debug;

use crate::error::ApplicationResult;
use crate::ports::{AccountClient, CallContext};

/// Resolves the identity behind the current credential.
pub struct GetUserInfo<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: AccountClient + ?Sized> GetUserInfo<'a, C> {
    /// Creates a new `GetUserInfo` use case.
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns the remote error if the session cannot be resolved.
    pub async fn execute(&self, ctx: &CallContext) -> ApplicationResult<Identity> {
        let identity = self.client.get_user_info(ctx).await?;
        debug!(
            username = %identity.username,
            issuer = %identity.issuer,
            logged_in = identity.logged_in,
            "resolved identity"
        );
        Ok(identity)
    }
}

/// Returns `account` when given, otherwise the current identity's username.
///
/// # Errors
/// Returns the remote error when the identity has to be fetched and cannot
/// be, or `InvalidArgument` when neither source yields a name.
pub async fn resolve_account_name<C: AccountClient + ?Sized>(
    client: &C,
    ctx: &CallContext,
    account: Option<&str>,
) -> ApplicationResult<String> {
    if let Some(account) = account.map(str::trim).filter(|a| !a.is_empty()) {
        return Ok(account.to_string());
    }
    let identity = GetUserInfo::new(client).execute(ctx).await?;
    acctl_domain::require_non_empty("account", &identity.username)?;
    Ok(identity.username)
}
