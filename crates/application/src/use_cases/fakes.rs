//! In-process fake of the remote account service for use case tests.
//!
//! Sessions are real state: logging in mints a fresh credential and changing
//! a password revokes every session of that account, so a credential issued
//! before a rotation is rejected afterwards.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::significant_drop_tightening)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use acctl_domain::{
    Account, AuthorizationRequest, BearerClaims, BearerCredential, Identity, LOCAL_ISSUER,
    Password, Token, unsigned_jwt,
};

use crate::ports::{AccountClient, CallContext, CreateTokenRequest, RemoteError, UpdatePasswordRequest};

/// One remote call as the fake server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetUserInfo,
    CanI(String, String, String),
    ListAccounts,
    GetAccount(String),
    CreateToken { account: String, expires_in: i64, id: String },
    DeleteToken { account: String, id: String },
    UpdatePassword { account: String, current: Option<String>, new: String },
    PasswordLogin { username: String, password: String },
}

struct User {
    password: String,
    issuer: String,
    groups: Vec<String>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    accounts: BTreeMap<String, Account>,
    sessions: HashMap<String, String>,
    grants: HashMap<(String, String, String), bool>,
    failures: HashMap<&'static str, RemoteError>,
    calls: Vec<Call>,
    issued: u32,
}

/// Fixed "now" of the fake server.
pub fn server_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Fake remote service shared by any number of clients.
#[derive(Default)]
pub struct FakeServer {
    state: Mutex<State>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a local user with an account entry.
    pub fn with_user(self, name: &str, password: &str) -> Self {
        self.with_federated_user(name, password, LOCAL_ISSUER)
    }

    /// Registers a user whose sessions come from `issuer`.
    pub fn with_federated_user(self, name: &str, password: &str, issuer: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.users.insert(
                name.to_string(),
                User {
                    password: password.to_string(),
                    issuer: issuer.to_string(),
                    groups: Vec::new(),
                },
            );
            let mut account = Account::new(name);
            account.capabilities = vec!["login".to_string(), "apiKey".to_string()];
            state.accounts.insert(name.to_string(), account);
        }
        self
    }

    pub fn with_groups(self, name: &str, groups: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let user = state.users.get_mut(name).unwrap();
            user.groups = groups.iter().map(|g| (*g).to_string()).collect();
        }
        self
    }

    pub fn with_token(self, account: &str, token: Token) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.accounts.get_mut(account).unwrap().tokens.push(token);
        }
        self
    }

    pub fn grant(self, action: &str, resource: &str, sub_resource: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.grants.insert(
                (action.to_string(), resource.to_string(), sub_resource.to_string()),
                true,
            );
        }
        self
    }

    /// Makes the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: RemoteError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    /// Logs in directly, bypassing the call log.
    pub fn session(&self, username: &str) -> BearerCredential {
        let mut state = self.state.lock().unwrap();
        mint(&mut state, username)
    }

    /// A client presenting `credential`.
    pub const fn client(&self, credential: BearerCredential) -> FakeClient<'_> {
        FakeClient {
            server: self,
            credential,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn password_of(&self, name: &str) -> String {
        self.state.lock().unwrap().users[name].password.clone()
    }

    pub fn account(&self, name: &str) -> Account {
        self.state.lock().unwrap().accounts[name].clone()
    }
}

fn mint(state: &mut State, username: &str) -> BearerCredential {
    state.issued += 1;
    let issuer = state
        .users
        .get(username)
        .map_or_else(|| LOCAL_ISSUER.to_string(), |u| u.issuer.clone());
    let token = unsigned_jwt(&BearerClaims {
        sub: format!("{username}:login"),
        iss: issuer,
        jti: Some(format!("session-{}", state.issued)),
        ..BearerClaims::default()
    });
    state.sessions.insert(token.clone(), username.to_string());
    BearerCredential::new(token)
}

/// Client bound to one credential.
pub struct FakeClient<'a> {
    server: &'a FakeServer,
    credential: BearerCredential,
}

impl FakeClient<'_> {
    fn begin(&self, operation: &'static str, call: Call) -> Result<String, RemoteError> {
        let mut state = self.server.state.lock().unwrap();
        state.calls.push(call);
        if let Some(error) = state.failures.remove(operation) {
            return Err(error);
        }
        state
            .sessions
            .get(self.credential.expose())
            .cloned()
            .ok_or_else(|| RemoteError::status(401, "invalid session"))
    }
}

#[async_trait]
impl AccountClient for FakeClient<'_> {
    async fn get_user_info(&self, ctx: &CallContext) -> Result<Identity, RemoteError> {
        ctx.ensure_active()?;
        let caller = self.begin("get_user_info", Call::GetUserInfo)?;
        let state = self.server.state.lock().unwrap();
        let user = &state.users[&caller];
        Ok(Identity::new(caller.clone(), user.issuer.clone()).with_groups(user.groups.clone()))
    }

    async fn can_i(
        &self,
        ctx: &CallContext,
        request: &AuthorizationRequest,
    ) -> Result<bool, RemoteError> {
        ctx.ensure_active()?;
        let key = (
            request.action().to_string(),
            request.resource().to_string(),
            request.sub_resource().to_string(),
        );
        self.begin("can_i", Call::CanI(key.0.clone(), key.1.clone(), key.2.clone()))?;
        Ok(self
            .server
            .state
            .lock()
            .unwrap()
            .grants
            .get(&key)
            .copied()
            .unwrap_or(false))
    }

    async fn list_accounts(&self, ctx: &CallContext) -> Result<Vec<Account>, RemoteError> {
        ctx.ensure_active()?;
        self.begin("list_accounts", Call::ListAccounts)?;
        Ok(self.server.state.lock().unwrap().accounts.values().cloned().collect())
    }

    async fn get_account(&self, ctx: &CallContext, name: &str) -> Result<Account, RemoteError> {
        ctx.ensure_active()?;
        self.begin("get_account", Call::GetAccount(name.to_string()))?;
        self.server
            .state
            .lock()
            .unwrap()
            .accounts
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::status(404, format!("account '{name}' does not exist")))
    }

    async fn create_token(
        &self,
        ctx: &CallContext,
        request: &CreateTokenRequest,
    ) -> Result<String, RemoteError> {
        ctx.ensure_active()?;
        self.begin(
            "create_token",
            Call::CreateToken {
                account: request.account.clone(),
                expires_in: request.expires_in.as_wire_seconds(),
                id: request.id.clone(),
            },
        )?;
        let mut state = self.server.state.lock().unwrap();
        let account = state.accounts.get_mut(&request.account).ok_or_else(|| {
            RemoteError::status(404, format!("account '{}' does not exist", request.account))
        })?;
        if account.has_token(&request.id) {
            return Err(RemoteError::status(
                409,
                format!("account already has token with id '{}'", request.id),
            ));
        }
        account
            .tokens
            .push(Token::issue(request.id.clone(), server_now(), request.expires_in));
        Ok(unsigned_jwt(&BearerClaims {
            sub: format!("{}:apiKey", request.account),
            iss: LOCAL_ISSUER.to_string(),
            jti: Some(request.id.clone()),
            ..BearerClaims::default()
        }))
    }

    async fn delete_token(
        &self,
        ctx: &CallContext,
        account: &str,
        id: &str,
    ) -> Result<(), RemoteError> {
        ctx.ensure_active()?;
        self.begin(
            "delete_token",
            Call::DeleteToken {
                account: account.to_string(),
                id: id.to_string(),
            },
        )?;
        let mut state = self.server.state.lock().unwrap();
        let entry = state
            .accounts
            .get_mut(account)
            .ok_or_else(|| RemoteError::status(404, format!("account '{account}' does not exist")))?;
        let before = entry.tokens.len();
        entry.tokens.retain(|t| t.id != id);
        if entry.tokens.len() == before {
            return Err(RemoteError::status(404, format!("token with id '{id}' not found")));
        }
        Ok(())
    }

    async fn update_password(
        &self,
        ctx: &CallContext,
        request: &UpdatePasswordRequest,
    ) -> Result<(), RemoteError> {
        ctx.ensure_active()?;
        let caller = self.begin(
            "update_password",
            Call::UpdatePassword {
                account: request.account.clone(),
                current: request.current_password.as_ref().map(|p| p.expose().to_string()),
                new: request.new_password.expose().to_string(),
            },
        )?;
        let mut state = self.server.state.lock().unwrap();
        let own_local = caller == request.account
            && state.users.get(&caller).is_some_and(|u| u.issuer == LOCAL_ISSUER);
        let user = state.users.get_mut(&request.account).ok_or_else(|| {
            RemoteError::status(404, format!("account '{}' does not exist", request.account))
        })?;
        if own_local
            && request.current_password.as_ref().map(Password::expose) != Some(user.password.as_str())
        {
            return Err(RemoteError::status(401, "current password does not match"));
        }
        user.password = request.new_password.expose().to_string();
        state.sessions.retain(|_, owner| owner != &request.account);
        Ok(())
    }

    async fn password_login(
        &self,
        ctx: &CallContext,
        username: &str,
        password: &Password,
    ) -> Result<BearerCredential, RemoteError> {
        ctx.ensure_active()?;
        let mut state = self.server.state.lock().unwrap();
        state.calls.push(Call::PasswordLogin {
            username: username.to_string(),
            password: password.expose().to_string(),
        });
        if let Some(error) = state.failures.remove("password_login") {
            return Err(error);
        }
        let valid = state
            .users
            .get(username)
            .is_some_and(|u| u.password == password.expose());
        if !valid {
            return Err(RemoteError::status(401, "Invalid username or password"));
        }
        Ok(mint(&mut state, username))
    }
}
