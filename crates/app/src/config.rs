//! Resolution of global options into runtime settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;

use acctl_application::{CallContext, CancellationReceiver};
use acctl_infrastructure::ServerConnection;

use crate::cli::GlobalArgs;

/// Name of the in-memory context used with `--auth-token`.
pub const AUTH_TOKEN_CONTEXT: &str = "auth-token";

impl GlobalArgs {
    /// Location of the local config file.
    ///
    /// # Errors
    ///
    /// Fails if no path was given and the platform has no config directory.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("acctl").join("config"))
            .context("cannot determine the config directory; pass --config")
    }

    /// The explicitly supplied bearer credential, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Applies command-line overrides to stored connection settings.
    #[must_use]
    pub fn connection(&self, stored: ServerConnection) -> ServerConnection {
        ServerConnection {
            server: self.server.clone().unwrap_or(stored.server),
            insecure: stored.insecure || self.insecure,
            plain_text: stored.plain_text || self.plaintext,
        }
    }

    /// Context for the remote calls of one command.
    #[must_use]
    pub fn call_context(&self, cancel: CancellationReceiver) -> CallContext {
        let ctx = CallContext::with_cancellation(cancel);
        if self.request_timeout == Duration::ZERO {
            ctx
        } else {
            ctx.with_call_timeout(self.request_timeout)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalArgs {
        let mut argv = vec!["acctl"];
        argv.extend_from_slice(args);
        argv.push("list");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn test_explicit_config_path() {
        let args = global(&["--config", "/tmp/acctl.yaml"]);
        assert_eq!(args.config_path().unwrap(), PathBuf::from("/tmp/acctl.yaml"));
    }

    #[test]
    fn test_flags_override_stored_connection() {
        let args = global(&["--server", "127.0.0.1:8080", "--plaintext"]);
        let stored = ServerConnection {
            server: "cd.example.com".to_string(),
            insecure: true,
            plain_text: false,
        };

        assert_eq!(
            args.connection(stored),
            ServerConnection {
                server: "127.0.0.1:8080".to_string(),
                insecure: true,
                plain_text: true,
            }
        );
    }

    #[test]
    fn test_blank_auth_token_is_ignored() {
        assert_eq!(global(&["--auth-token", "  "]).auth_token(), None);
        assert_eq!(global(&["--auth-token", "abc"]).auth_token(), Some("abc"));
    }
}
