//! Remote account client implementation using reqwest.
//!
//! This adapter implements the `AccountClient` port against the service's
//! JSON REST gateway. Every call is single-shot and raced against the
//! caller's `CallContext`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use acctl_application::ports::{
    AccountClient, CallContext, CreateTokenRequest, RemoteError, UpdatePasswordRequest,
};
use acctl_domain::{Account, AuthorizationRequest, BearerCredential, Identity, Password};

const USER_AGENT: &str = concat!("acctl/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConnection {
    /// Server address, with or without a scheme.
    pub server: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Use plain HTTP instead of HTTPS.
    pub plain_text: bool,
}

impl ServerConnection {
    /// Creates settings for a server with TLS verification enabled.
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            insecure: false,
            plain_text: false,
        }
    }

    /// Base URL of the server's API.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the address is not a valid URL.
    pub fn base_url(&self) -> Result<Url, RemoteError> {
        let server = self.server.trim().trim_end_matches('/');
        if server.is_empty() {
            return Err(RemoteError::Transport("no server address configured".to_string()));
        }
        let address = if server.contains("://") {
            server.to_string()
        } else if self.plain_text {
            format!("http://{server}")
        } else {
            format!("https://{server}")
        };
        Url::parse(&address)
            .map_err(|e| RemoteError::Transport(format!("invalid server address '{server}': {e}")))
    }
}

/// Account client implementation using reqwest.
pub struct HttpAccountClient {
    client: Client,
    base_url: Url,
    credential: BearerCredential,
}

impl HttpAccountClient {
    /// Creates a client for `connection` presenting `credential`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the client cannot be built.
    pub fn new(connection: &ServerConnection, credential: BearerCredential) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(connection.insecure)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: connection.base_url()?,
            credential,
        })
    }

    /// Creates a client from an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, credential: BearerCredential) -> Self {
        Self {
            client,
            base_url,
            credential,
        }
    }

    /// Builds an API URL from percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Transport(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, RemoteError> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "remote call");
        Ok(self.client.request(method, url))
    }

    fn authorized(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, RemoteError> {
        Ok(self.request(method, segments)?.bearer_auth(self.credential.expose()))
    }

    /// Sends a request and decodes a JSON response body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        builder: RequestBuilder,
    ) -> Result<T, RemoteError> {
        ctx.run(async move {
            let response = send(builder).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()))
        })
        .await
    }

    /// Sends a request whose response body carries nothing of interest.
    async fn acknowledge(&self, ctx: &CallContext, builder: RequestBuilder) -> Result<(), RemoteError> {
        ctx.run(async move { send(builder).await.map(drop) }).await
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, RemoteError> {
    let response = builder.send().await.map_err(map_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });
    debug!(status = status.as_u16(), %message, "remote call failed");
    Err(RemoteError::status(status.as_u16(), message))
}

/// Maps reqwest errors to `RemoteError`.
fn map_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        return RemoteError::Timeout;
    }
    RemoteError::Transport(error.to_string())
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.is_empty())
            .or(self.error)
            .filter(|m| !m.is_empty())
    }
}

/// `can-i` answers arrive as a bool or as `"yes"`/`"no"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Decision {
    Flag(bool),
    Word(String),
}

#[derive(Deserialize)]
struct CanIResponse {
    value: Decision,
}

impl CanIResponse {
    fn allowed(self) -> Result<bool, RemoteError> {
        match self.value {
            Decision::Flag(flag) => Ok(flag),
            Decision::Word(word) => match word.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" => Ok(true),
                "no" | "false" => Ok(false),
                other => Err(RemoteError::Decode(format!("unexpected can-i value '{other}'"))),
            },
        }
    }
}

#[derive(Deserialize)]
struct AccountList {
    #[serde(default)]
    items: Option<Vec<Account>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenBody<'a> {
    name: &'a str,
    expires_in: i64,
    id: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_password: Option<&'a str>,
    new_password: &'a str,
}

#[derive(Serialize)]
struct SessionBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[async_trait]
impl AccountClient for HttpAccountClient {
    async fn get_user_info(&self, ctx: &CallContext) -> Result<Identity, RemoteError> {
        let builder = self.authorized(Method::GET, &["session", "userinfo"])?;
        self.fetch(ctx, builder).await
    }

    async fn can_i(
        &self,
        ctx: &CallContext,
        request: &AuthorizationRequest,
    ) -> Result<bool, RemoteError> {
        let builder = self.authorized(
            Method::GET,
            &[
                "account",
                "can-i",
                request.resource(),
                request.action(),
                request.sub_resource(),
            ],
        )?;
        let response: CanIResponse = self.fetch(ctx, builder).await?;
        response.allowed()
    }

    async fn list_accounts(&self, ctx: &CallContext) -> Result<Vec<Account>, RemoteError> {
        let builder = self.authorized(Method::GET, &["account"])?;
        let list: AccountList = self.fetch(ctx, builder).await?;
        Ok(list.items.unwrap_or_default())
    }

    async fn get_account(&self, ctx: &CallContext, name: &str) -> Result<Account, RemoteError> {
        let builder = self.authorized(Method::GET, &["account", name])?;
        self.fetch(ctx, builder).await
    }

    async fn create_token(
        &self,
        ctx: &CallContext,
        request: &CreateTokenRequest,
    ) -> Result<String, RemoteError> {
        let builder = self
            .authorized(Method::POST, &["account", &request.account, "token"])?
            .json(&CreateTokenBody {
                name: &request.account,
                expires_in: request.expires_in.as_wire_seconds(),
                id: &request.id,
            });
        let response: TokenResponse = self.fetch(ctx, builder).await?;
        Ok(response.token)
    }

    async fn delete_token(
        &self,
        ctx: &CallContext,
        account: &str,
        id: &str,
    ) -> Result<(), RemoteError> {
        let builder = self.authorized(Method::DELETE, &["account", account, "token", id])?;
        self.acknowledge(ctx, builder).await
    }

    async fn update_password(
        &self,
        ctx: &CallContext,
        request: &UpdatePasswordRequest,
    ) -> Result<(), RemoteError> {
        let builder = self
            .authorized(Method::PUT, &["account", "password"])?
            .json(&UpdatePasswordBody {
                name: &request.account,
                current_password: request.current_password.as_ref().map(Password::expose),
                new_password: request.new_password.expose(),
            });
        self.acknowledge(ctx, builder).await
    }

    async fn password_login(
        &self,
        ctx: &CallContext,
        username: &str,
        password: &Password,
    ) -> Result<BearerCredential, RemoteError> {
        let builder = self.request(Method::POST, &["session"])?.json(&SessionBody {
            username,
            password: password.expose(),
        });
        let response: TokenResponse = self.fetch(ctx, builder).await?;
        if response.token.is_empty() {
            return Err(RemoteError::Decode("login returned an empty token".to_string()));
        }
        Ok(BearerCredential::new(response.token))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use acctl_domain::TokenLifetime;
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn client_for(server: &MockServer) -> HttpAccountClient {
        let connection = ServerConnection::new(server.base_url());
        HttpAccountClient::new(&connection, BearerCredential::new("t0k3n")).unwrap()
    }

    #[test]
    fn test_base_url_scheme_selection() {
        assert_eq!(
            ServerConnection::new("cd.example.com").base_url().unwrap().as_str(),
            "https://cd.example.com/"
        );
        let plain = ServerConnection {
            plain_text: true,
            ..ServerConnection::new("localhost:8080/")
        };
        assert_eq!(plain.base_url().unwrap().as_str(), "http://localhost:8080/");
        assert!(ServerConnection::new(" ").base_url().is_err());
    }

    #[test]
    fn test_path_segments_are_percent_encoded() {
        let client = HttpAccountClient::with_client(
            Client::new(),
            Url::parse("https://cd.example.com/").unwrap(),
            BearerCredential::default(),
        );
        let url = client
            .endpoint(&["account", "can-i", "applications", "get", "default/guestbook"])
            .unwrap();
        assert_eq!(url.path(), "/api/v1/account/can-i/applications/get/default%2Fguestbook");
    }

    #[tokio::test]
    async fn test_get_user_info_sends_bearer_credential() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/session/userinfo")
                .header("authorization", "Bearer t0k3n");
            then.status(200).json_body(json!({
                "loggedIn": true,
                "username": "alice",
                "iss": "argocd",
                "groups": ["dev"]
            }));
        });

        let identity = client_for(&server)
            .get_user_info(&CallContext::background())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(identity, Identity::new("alice", "argocd").with_groups(["dev"]));
    }

    #[tokio::test]
    async fn test_can_i_accepts_word_answers() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/account/can-i/applications/sync/default");
            then.status(200).json_body(json!({ "value": "yes" }));
        });
        let request = AuthorizationRequest::new("sync", "applications", "default").unwrap();

        let allowed = client_for(&server)
            .can_i(&CallContext::background(), &request)
            .await
            .unwrap();

        assert!(allowed);
    }

    #[tokio::test]
    async fn test_list_accounts_tolerates_null_items() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/account");
            then.status(200).json_body(json!({ "items": null }));
        });

        let accounts = client_for(&server)
            .list_accounts(&CallContext::background())
            .await
            .unwrap();

        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn test_get_account_decodes_string_timestamps() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/account/ci");
            then.status(200).json_body(json!({
                "name": "ci",
                "enabled": true,
                "capabilities": ["apiKey"],
                "tokens": [{ "id": "build-1", "issuedAt": "1767225600", "expiresAt": 1767229200 }]
            }));
        });

        let account = client_for(&server)
            .get_account(&CallContext::background(), "ci")
            .await
            .unwrap();

        let token = account.token("build-1").unwrap();
        assert_eq!(token.issued_at.timestamp(), 1_767_225_600);
        assert_eq!(token.expires_at.map(|t| t.timestamp()), Some(1_767_229_200));
    }

    #[tokio::test]
    async fn test_create_token_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/account/svc/token")
                .json_body(json!({ "name": "svc", "expiresIn": 86400, "id": "build-123" }));
            then.status(200).json_body(json!({ "token": "eyJ.abc.def" }));
        });

        let token = client_for(&server)
            .create_token(
                &CallContext::background(),
                &CreateTokenRequest {
                    account: "svc".to_string(),
                    expires_in: TokenLifetime::Seconds(86_400),
                    id: "build-123".to_string(),
                },
            )
            .await
            .unwrap();

        mock.assert_calls(1);
        assert_eq!(token, "eyJ.abc.def");
    }

    #[tokio::test]
    async fn test_delete_token_not_found_carries_remote_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/api/v1/account/ci/token/nope");
            then.status(404)
                .json_body(json!({ "error": "token not found", "message": "token with id 'nope' not found", "code": 5 }));
        });

        let error = client_for(&server)
            .delete_token(&CallContext::background(), "ci", "nope")
            .await
            .unwrap_err();

        assert_eq!(error, RemoteError::status(404, "token with id 'nope' not found"));
    }

    #[tokio::test]
    async fn test_update_password_omits_absent_current_password() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/v1/account/password")
                .json_body(json!({ "name": "bob", "newPassword": "n3w" }));
            then.status(200).json_body(json!({}));
        });

        client_for(&server)
            .update_password(
                &CallContext::background(),
                &UpdatePasswordRequest {
                    account: "bob".to_string(),
                    current_password: None,
                    new_password: Password::new("n3w"),
                },
            )
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_password_login_is_unauthenticated() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/session")
                .json_body(json!({ "username": "alice", "password": "new" }));
            then.status(200).json_body(json!({ "token": "fresh" }));
        });

        let credential = client_for(&server)
            .password_login(&CallContext::background(), "alice", &Password::new("new"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(credential.expose(), "fresh");
    }

    #[tokio::test]
    async fn test_plain_text_error_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/session/userinfo");
            then.status(401).body("invalid session");
        });

        let error = client_for(&server)
            .get_user_info(&CallContext::background())
            .await
            .unwrap_err();

        assert!(error.is_unauthenticated());
        assert_eq!(error.to_string(), "invalid session (status 401)");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let connection = ServerConnection {
            plain_text: true,
            ..ServerConnection::new("127.0.0.1:9")
        };
        let client = HttpAccountClient::new(&connection, BearerCredential::default()).unwrap();

        let error = client
            .list_accounts(&CallContext::background())
            .await
            .unwrap_err();

        assert!(matches!(error, RemoteError::Transport(_)));
    }
}
