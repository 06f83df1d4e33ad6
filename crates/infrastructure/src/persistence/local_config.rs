//! File-backed local credential store.
//!
//! The config file is YAML:
//!
//! ```text
//! current-context: prod
//! contexts:
//!   - name: prod
//!     server: cd.example.com
//!     user: prod
//! servers:
//!   - server: cd.example.com
//!     insecure: false
//!     plain-text: false
//! users:
//!   - name: prod
//!     auth-token: <bearer credential>
//! ```
//!
//! A missing file loads as an empty config. Writes go to a sibling temp file
//! that is then renamed over the original.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use acctl_application::ports::{CredentialStore, CredentialStoreError, FileSystem, FileSystemError};
use acctl_domain::{BearerCredential, CredentialContext};

use crate::adapters::ServerConnection;
use crate::serialization::{SerializationError, from_yaml_bytes, to_yaml};

/// A named context pointing at a server and a user entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRef {
    /// Context name.
    pub name: String,
    /// Server address, matching a `servers` entry.
    pub server: String,
    /// User name, matching a `users` entry.
    pub user: String,
}

/// Connection settings for one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerEntry {
    /// Server address.
    pub server: String,
    /// Skip TLS verification.
    #[serde(default)]
    pub insecure: bool,
    /// Use plain HTTP.
    #[serde(default)]
    pub plain_text: bool,
}

/// A stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserEntry {
    /// User entry name.
    pub name: String,
    /// Bearer credential.
    #[serde(default)]
    pub auth_token: BearerCredential,
}

/// Contents of the local config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalConfig {
    /// Name of the current context; empty when none.
    #[serde(default)]
    pub current_context: String,
    /// Named contexts.
    #[serde(default)]
    pub contexts: Vec<ContextRef>,
    /// Known servers.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    /// Stored credentials.
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl LocalConfig {
    /// Looks up a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&ContextRef> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Looks up a server entry by address.
    #[must_use]
    pub fn server(&self, server: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.server == server)
    }

    /// Looks up a user entry by name.
    #[must_use]
    pub fn user(&self, name: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.name == name)
    }

    /// Connection settings for the server a context points at.
    #[must_use]
    pub fn connection(&self, context: &CredentialContext) -> ServerConnection {
        self.server(&context.server).map_or_else(
            || ServerConnection::new(context.server.clone()),
            |entry| ServerConnection {
                server: entry.server.clone(),
                insecure: entry.insecure,
                plain_text: entry.plain_text,
            },
        )
    }

    fn current(&self) -> Option<&str> {
        Some(self.current_context.as_str()).filter(|c| !c.is_empty())
    }

    fn resolve(&self, name: Option<&str>) -> Result<CredentialContext, CredentialStoreError> {
        let name = name
            .or_else(|| self.current())
            .ok_or(CredentialStoreError::NoCurrentContext)?;
        let context = self
            .context(name)
            .ok_or_else(|| CredentialStoreError::ContextNotFound(name.to_string()))?;
        if self.server(&context.server).is_none() {
            return Err(CredentialStoreError::Incomplete {
                context: name.to_string(),
                reason: format!("server '{}' is not configured", context.server),
            });
        }
        let user = self.user(&context.user).ok_or_else(|| CredentialStoreError::Incomplete {
            context: name.to_string(),
            reason: format!("user '{}' is not configured", context.user),
        })?;
        Ok(CredentialContext::new(
            context.name.clone(),
            context.server.clone(),
            user.auth_token.clone(),
        ))
    }

    fn upsert(&mut self, record: &CredentialContext) {
        let user_name = match self.context(&record.context_name) {
            Some(existing) => existing.user.clone(),
            None => {
                self.contexts.push(ContextRef {
                    name: record.context_name.clone(),
                    server: record.server.clone(),
                    user: record.context_name.clone(),
                });
                record.context_name.clone()
            }
        };
        if self.server(&record.server).is_none() {
            self.servers.push(ServerEntry {
                server: record.server.clone(),
                insecure: false,
                plain_text: false,
            });
        }
        match self.users.iter_mut().find(|u| u.name == user_name) {
            Some(user) => user.auth_token = record.bearer_credential.clone(),
            None => self.users.push(UserEntry {
                name: user_name,
                auth_token: record.bearer_credential.clone(),
            }),
        }
        if self.current_context.is_empty() {
            self.current_context.clone_from(&record.context_name);
        }
    }
}

fn serialization_error(error: SerializationError) -> CredentialStoreError {
    CredentialStoreError::Serialization(error.to_string())
}

/// Credential store persisted as a YAML file.
#[derive(Debug)]
pub struct FileCredentialStore<F> {
    fs: F,
    path: PathBuf,
    config: LocalConfig,
}

impl<F: FileSystem> FileCredentialStore<F> {
    /// Loads the store from `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(fs: F, path: impl Into<PathBuf>) -> Result<Self, CredentialStoreError> {
        let path = path.into();
        let config = match fs.read_file(&path).await {
            Ok(bytes) => from_yaml_bytes(&bytes).map_err(serialization_error)?,
            Err(FileSystemError::NotFound(_)) => {
                debug!(path = %path.display(), "no local config; starting empty");
                LocalConfig::default()
            }
            Err(error) => return Err(CredentialStoreError::Io(error.into())),
        };
        Ok(Self { fs, path, config })
    }

    /// The parsed config.
    #[must_use]
    pub const fn config(&self) -> &LocalConfig {
        &self.config
    }

    /// Location of the config file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("config"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<F: FileSystem> CredentialStore for FileCredentialStore<F> {
    fn current_context(&self) -> Option<String> {
        self.config.current().map(str::to_string)
    }

    fn resolve(&self, name: Option<&str>) -> Result<CredentialContext, CredentialStoreError> {
        self.config.resolve(name)
    }

    fn upsert(&mut self, record: &CredentialContext) -> Result<(), CredentialStoreError> {
        self.config.upsert(record);
        Ok(())
    }

    async fn persist(&self) -> Result<(), CredentialStoreError> {
        let yaml = to_yaml(&self.config).map_err(serialization_error)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(parent)
                .await
                .map_err(|e| CredentialStoreError::Io(e.into()))?;
        }

        let temp = self.temp_path();
        self.fs
            .write_file(&temp, yaml.as_bytes())
            .await
            .map_err(|e| CredentialStoreError::Io(e.into()))?;
        if let Err(error) = self.fs.rename(&temp, &self.path).await {
            let _ = self.fs.remove_file(&temp).await;
            return Err(CredentialStoreError::Io(error.into()));
        }
        debug!(path = %self.path.display(), "local config written");
        Ok(())
    }
}
