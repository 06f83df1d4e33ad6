//! Password rotation use case
//!
//! Changes an account's password and, when the operator rotated the password
//! of the session they are logged in with, logs in again and replaces the
//! stored credential before reporting success.
//!
//! ```text
//! Idle -> CollectingCredentials -> Submitting -> RefreshingSession -> PersistingCredential -> Done
//!               |                      |   \
//!               +------> Aborted <-----+    +--> Done   (another account, or refresh skipped)
//! ```
//!
//! Once `Submitting` succeeds the old password is gone server-side. Any later
//! failure, cancellation included, surfaces as [`ApplicationError::Persistence`].

use acctl_domain::{CredentialContext, LOCAL_ISSUER, Password, require_non_empty};
use tracing::{info, warn};

use crate::error::{ApplicationError, ApplicationResult, RefreshStage};
use crate::ports::{AccountClient, CallContext, CredentialStore, Prompt, UpdatePasswordRequest};

/// States of the rotation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationState {
    /// Not started.
    #[default]
    Idle,
    /// Resolving the caller and gathering passwords.
    CollectingCredentials,
    /// Sending the password change.
    Submitting,
    /// Logging in with the new password.
    RefreshingSession,
    /// Writing the fresh credential to the local store.
    PersistingCredential,
    /// The rotation completed.
    Done,
    /// The rotation stopped before the server changed anything.
    Aborted,
}

impl RotationState {
    /// Check if the flow reached a terminal state.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if `next` is a legal successor.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::CollectingCredentials)
                | (Self::CollectingCredentials, Self::Submitting | Self::Aborted)
                | (Self::Submitting, Self::RefreshingSession | Self::Done | Self::Aborted)
                | (Self::RefreshingSession, Self::PersistingCredential)
                | (Self::PersistingCredential, Self::Done)
        )
    }
}

/// Tracks the states a rotation passes through.
#[derive(Debug, Clone)]
pub struct Rotation {
    state: RotationState,
    history: Vec<RotationState>,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new()
    }
}

impl Rotation {
    /// A rotation in the `Idle` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RotationState::Idle,
            history: vec![RotationState::Idle],
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RotationState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> &[RotationState] {
        &self.history
    }

    fn advance(&mut self, next: RotationState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal rotation transition {:?} -> {next:?}",
            self.state
        );
        info!(from = ?self.state, to = ?next, "rotation transition");
        self.state = next;
        self.history.push(next);
    }

    fn abort(&mut self, error: ApplicationError) -> ApplicationError {
        warn!(state = ?self.state, error = %error, "password change aborted");
        self.advance(RotationState::Aborted);
        error
    }
}

/// Input for a password rotation.
#[derive(Debug, Clone, Default)]
pub struct UpdatePasswordInput {
    /// Account to rotate; defaults to the caller.
    pub account: Option<String>,
    /// Caller's current password, prompted for when required and absent.
    pub current_password: Option<Password>,
    /// New password, prompted for (twice) when absent.
    pub new_password: Option<Password>,
    /// Local context to refresh; the store's current context when absent.
    pub context: Option<String>,
    /// Never log in again or write the store, even for the caller's own
    /// account. Used when the credential did not come from the store.
    pub skip_refresh: bool,
}

/// Result of a completed rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationReport {
    /// Account whose password changed.
    pub account: String,
    /// Local context that received a fresh credential, if any.
    pub updated_context: Option<String>,
    /// The caller's own password changed but no fresh credential was
    /// obtained, so the one used for this call is no longer valid.
    pub credential_invalidated: bool,
    /// States the flow passed through.
    pub states: Vec<RotationState>,
}

/// Rotates a password and refreshes the local credential when needed.
pub struct UpdatePassword<'a, C: ?Sized, P: ?Sized> {
    client: &'a C,
    prompt: &'a P,
}

impl<'a, C: AccountClient + ?Sized, P: Prompt + ?Sized> UpdatePassword<'a, C, P> {
    /// Creates a new `UpdatePassword` use case.
    pub const fn new(client: &'a C, prompt: &'a P) -> Self {
        Self { client, prompt }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// See [`UpdatePassword::run`].
    pub async fn execute<S: CredentialStore + ?Sized>(
        &self,
        ctx: &CallContext,
        store: &mut S,
        input: UpdatePasswordInput,
    ) -> ApplicationResult<RotationReport> {
        self.run(ctx, store, input, &mut Rotation::new()).await
    }

    /// Executes the use case, recording transitions into `rotation`.
    ///
    /// # Errors
    /// - `InvalidArgument` for empty or mismatched password entries
    /// - `Remote` if the caller cannot be resolved or the change is refused
    /// - `Persistence` if the change succeeded but the local credential could
    ///   not be refreshed
    /// - `Cancelled`/`Timeout` if interrupted before the change was sent
    pub async fn run<S: CredentialStore + ?Sized>(
        &self,
        ctx: &CallContext,
        store: &mut S,
        input: UpdatePasswordInput,
        rotation: &mut Rotation,
    ) -> ApplicationResult<RotationReport> {
        rotation.advance(RotationState::CollectingCredentials);
        let collected = self
            .collect(ctx, input.account, input.current_password, input.new_password)
            .await;
        let (request, own_account) = match collected {
            Ok(collected) => collected,
            Err(error) => return Err(rotation.abort(error)),
        };

        rotation.advance(RotationState::Submitting);
        let submitted = match ctx.ensure_active() {
            Ok(()) => self.client.update_password(ctx, &request).await.map_err(ApplicationError::from),
            Err(interrupted) => Err(interrupted.into()),
        };
        if let Err(error) = submitted {
            return Err(rotation.abort(error));
        }
        info!(account = %request.account, "password updated");

        if !own_account || input.skip_refresh {
            if own_account {
                warn!(account = %request.account, "refresh skipped; current credential is now invalid");
            } else {
                warn!(account = %request.account, "rotated another account; local credential untouched");
            }
            rotation.advance(RotationState::Done);
            return Ok(RotationReport {
                account: request.account,
                updated_context: None,
                credential_invalidated: own_account,
                states: rotation.history().to_vec(),
            });
        }

        rotation.advance(RotationState::RefreshingSession);
        let refreshed = self
            .refresh(ctx, &*store, input.context.as_deref(), &request)
            .await?;

        rotation.advance(RotationState::PersistingCredential);
        let context_name = refreshed.context_name.clone();
        let written = self.write(ctx, store, &refreshed).await;
        if let Err(reason) = written {
            return Err(stale(&request.account, &context_name, RefreshStage::Write, reason));
        }
        info!(context = %context_name, "context updated");

        rotation.advance(RotationState::Done);
        Ok(RotationReport {
            account: request.account,
            updated_context: Some(context_name),
            credential_invalidated: false,
            states: rotation.history().to_vec(),
        })
    }

    /// Resolves the target account and gathers both passwords.
    ///
    /// Returns the request and whether the caller is rotating their own
    /// account.
    async fn collect(
        &self,
        ctx: &CallContext,
        account: Option<String>,
        current_password: Option<Password>,
        new_password: Option<Password>,
    ) -> ApplicationResult<(UpdatePasswordRequest, bool)> {
        let identity = self.client.get_user_info(ctx).await?;
        let account = account
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| identity.username.clone());
        require_non_empty("account", &account)?;

        let own_account = identity.is_account(&account);
        let current_password = if own_account && identity.is_issued_by(LOCAL_ISSUER) {
            let password = match current_password.filter(|p| !p.is_empty()) {
                Some(password) => password,
                None => self.prompt.read_secret(&format!(
                    "*** Enter password of currently logged in user ({}): ",
                    identity.username
                ))?,
            };
            if password.is_empty() {
                return Err(acctl_domain::DomainError::EmptyPassword.into());
            }
            Some(password)
        } else {
            None
        };

        let new_password = match new_password.filter(|p| !p.is_empty()) {
            Some(password) => password,
            None => self.prompt.read_and_confirm_secret(&account)?,
        };

        Ok((
            UpdatePasswordRequest {
                account,
                current_password,
                new_password,
            },
            own_account,
        ))
    }

    /// Logs in with the new password and returns the refreshed context.
    async fn refresh<S: CredentialStore + ?Sized>(
        &self,
        ctx: &CallContext,
        store: &S,
        context: Option<&str>,
        request: &UpdatePasswordRequest,
    ) -> ApplicationResult<CredentialContext> {
        let account = request.account.as_str();
        let context_label = context
            .map(str::to_string)
            .or_else(|| store.current_context())
            .unwrap_or_default();

        let local = store
            .resolve(context)
            .map_err(|e| stale(account, &context_label, RefreshStage::ResolveContext, e.to_string()))?;
        let username = local
            .claims()
            .map(|claims| claims.username().to_string())
            .map_err(|e| stale(account, &local.context_name, RefreshStage::ResolveContext, e.to_string()))?;
        if username.is_empty() {
            return Err(stale(
                account,
                &local.context_name,
                RefreshStage::ResolveContext,
                "stored credential has no subject".to_string(),
            ));
        }

        ctx.ensure_active()
            .map_err(|e| stale(account, &local.context_name, RefreshStage::Relogin, e.to_string()))?;
        let credential = self
            .client
            .password_login(ctx, &username, &request.new_password)
            .await
            .map_err(|e| stale(account, &local.context_name, RefreshStage::Relogin, e.to_string()))?;

        Ok(local.with_credential(credential))
    }

    async fn write<S: CredentialStore + ?Sized>(
        &self,
        ctx: &CallContext,
        store: &mut S,
        refreshed: &CredentialContext,
    ) -> Result<(), String> {
        ctx.ensure_active().map_err(|e| e.to_string())?;
        store.upsert(refreshed).map_err(|e| e.to_string())?;
        store.persist().await.map_err(|e| e.to_string())
    }
}

fn stale(account: &str, context: &str, stage: RefreshStage, reason: String) -> ApplicationError {
    warn!(account, context, %stage, reason = %reason, "local credential left stale after password change");
    ApplicationError::Persistence {
        account: account.to_string(),
        context: context.to_string(),
        stage,
        reason,
    }
}
