//! Generate token use case

use acctl_domain::{BearerCredential, TokenLifetime, token_id_or_generate};
use tracing::info;

use crate::error::ApplicationResult;
use crate::ports::{AccountClient, CallContext, CreateTokenRequest};
use crate::use_cases::resolve_account_name;

/// Input for token creation.
#[derive(Debug, Clone, Default)]
pub struct GenerateTokenInput {
    /// Account to issue the token for; defaults to the caller.
    pub account: Option<String>,
    /// Lifetime as a duration string; `"0s"` or empty means never.
    pub expires_in: String,
    /// Token id; generated when absent.
    pub id: Option<String>,
}

/// Result of token creation.
#[derive(Debug, Clone)]
pub struct GenerateTokenOutput {
    /// Account the token was issued for.
    pub account: String,
    /// Id the token was created with.
    pub id: String,
    /// Requested lifetime.
    pub lifetime: TokenLifetime,
    /// The token exactly as returned by the server.
    pub token: BearerCredential,
}

/// Issues a scoped token for an account.
///
/// The token is returned to the caller and never stored.
pub struct GenerateToken<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: AccountClient + ?Sized> GenerateToken<'a, C> {
    /// Creates a new `GenerateToken` use case.
    pub const fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a malformed or negative lifetime before
    /// any remote call, or the remote error.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        input: GenerateTokenInput,
    ) -> ApplicationResult<GenerateTokenOutput> {
        let lifetime = TokenLifetime::parse(&input.expires_in)?;
        let account = resolve_account_name(self.client, ctx, input.account.as_deref()).await?;
        let id = token_id_or_generate(input.id.as_deref());

        ctx.ensure_active()?;
        let request = CreateTokenRequest {
            account,
            expires_in: lifetime,
            id,
        };
        let token = self.client.create_token(ctx, &request).await?;
        info!(
            account = %request.account,
            id = %request.id,
            expires_in = request.expires_in.as_wire_seconds(),
            "token created"
        );

        Ok(GenerateTokenOutput {
            account: request.account,
            id: request.id,
            lifetime,
            token: BearerCredential::new(token),
        })
    }
}
