//! Authorization query use case

use acctl_domain::{AuthorizationDecision, AuthorizationRequest};
use tracing::debug;

use crate::error::ApplicationResult;
use crate::ports::{AccountClient, CallContext};

/// Asks the remote service whether the caller may perform an action.
///
/// The decision is passed through verbatim. Capabilities listed on accounts
/// are never consulted.
pub struct AuthorizationQuery<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: AccountClient + ?Sized> AuthorizationQuery<'a, C> {
    /// Creates a new `AuthorizationQuery` use case.
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an empty field, before any remote call,
    /// or the remote error.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        action: &str,
        resource: &str,
        sub_resource: &str,
    ) -> ApplicationResult<AuthorizationDecision> {
        let request = AuthorizationRequest::new(action, resource, sub_resource)?;
        let allowed = self.client.can_i(ctx, &request).await?;
        debug!(action, resource, sub_resource, allowed, "authorization decision");
        Ok(AuthorizationDecision(allowed))
    }
}
