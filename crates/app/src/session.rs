//! Opens the credential store and the remote client for one command.

use anyhow::Context as _;
use tracing::debug;

use acctl_application::{ApplicationError, CredentialStore, InMemoryCredentialStore};
use acctl_domain::{BearerCredential, CredentialContext};
use acctl_infrastructure::{FileCredentialStore, HttpAccountClient, ServerConnection, TokioFileSystem};

use crate::cli::GlobalArgs;
use crate::config::AUTH_TOKEN_CONTEXT;

/// Store and client bound to the selected context.
pub struct Session {
    /// Where refreshed credentials are written.
    pub store: Box<dyn CredentialStore>,
    /// Client authenticated with the context's credential.
    pub client: HttpAccountClient,
}

impl Session {
    /// Opens a session for the options given.
    ///
    /// With `--auth-token` nothing is read from disk and nothing is written
    /// back. Otherwise the context comes from the local config file.
    ///
    /// # Errors
    ///
    /// Fails if the config cannot be loaded, the context cannot be resolved
    /// or the server address is invalid.
    pub async fn open(global: &GlobalArgs) -> anyhow::Result<Self> {
        if let Some(token) = global.auth_token() {
            let server = global
                .server
                .clone()
                .context("--auth-token requires --server")?;
            let context =
                CredentialContext::new(AUTH_TOKEN_CONTEXT, server.clone(), BearerCredential::new(token));
            let connection = global.connection(ServerConnection::new(server));
            let credential = context.bearer_credential.clone();
            let store = InMemoryCredentialStore::single(context);
            return Self::connect(&connection, credential, Box::new(store));
        }

        let path = global.config_path()?;
        debug!(path = %path.display(), "loading local config");
        let store = FileCredentialStore::load(TokioFileSystem::new(), path)
            .await
            .map_err(ApplicationError::from)?;
        let context = store
            .resolve(global.context.as_deref())
            .map_err(ApplicationError::from)?;
        let connection = global.connection(store.config().connection(&context));
        debug!(context = %context.context_name, "resolved context");
        Self::connect(&connection, context.bearer_credential, Box::new(store))
    }

    fn connect(
        connection: &ServerConnection,
        credential: BearerCredential,
        store: Box<dyn CredentialStore>,
    ) -> anyhow::Result<Self> {
        let client =
            HttpAccountClient::new(connection, credential).map_err(ApplicationError::from)?;
        debug!(server = %connection.server, "session opened");
        Ok(Self { store, client })
    }
}
