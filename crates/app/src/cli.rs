//! Command-line surface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use acctl_domain::{OutputFormat, parse_duration};

fn parse_request_timeout(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|error| error.to_string())
}

/// Manage accounts, tokens and passwords on a remote deployment service.
#[derive(Debug, Parser)]
#[command(name = "acctl", version, about)]
pub struct Cli {
    /// Connection and session options.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Path to the local config file (default: <config dir>/acctl/config).
    #[arg(long, global = true, env = "ACCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Name of the context to use instead of the current one.
    #[arg(long, global = true, env = "ACCTL_CONTEXT")]
    pub context: Option<String>,

    /// Server address; overrides the context's server.
    #[arg(long, global = true, env = "ACCTL_SERVER")]
    pub server: Option<String>,

    /// Bearer credential to use instead of the stored one (requires --server).
    #[arg(long = "auth-token", global = true, env = "ACCTL_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Use plain HTTP instead of HTTPS.
    #[arg(long, global = true)]
    pub plaintext: bool,

    /// Timeout for each remote call; 0 disables it.
    #[arg(
        long = "request-timeout",
        global = true,
        default_value = "30s",
        value_parser = parse_request_timeout
    )]
    pub request_timeout: Duration,

    /// Approve confirmations without asking and never read from the terminal.
    #[arg(long = "no-prompts", global = true, env = "ACCTL_NO_PROMPTS")]
    pub no_prompts: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output selection for read commands.
#[derive(Debug, Clone, Copy, Args)]
pub struct OutputArgs {
    /// Output format: wide, name, json or yaml.
    #[arg(short, long, default_value = "wide")]
    pub output: OutputFormat,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Update an account's password.
    UpdatePassword {
        /// Account name; defaults to the current user.
        #[arg(short, long)]
        account: Option<String>,
        /// Password of the currently logged in user.
        #[arg(long = "current-password")]
        current_password: Option<String>,
        /// New password.
        #[arg(long = "new-password")]
        new_password: Option<String>,
    },

    /// Show the current user's identity.
    #[command(alias = "whoami")]
    GetUserInfo {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check whether the current user may perform an action.
    CanI {
        /// Action, e.g. `get` or `sync`.
        action: String,
        /// Resource kind, e.g. `applications`.
        resource: String,
        /// Object the action applies to, e.g. `default/guestbook`.
        subresource: String,
    },

    /// List accounts.
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show an account and its tokens.
    Get {
        /// Account name; defaults to the current user.
        #[arg(short, long)]
        account: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a token for an account.
    GenerateToken {
        /// Account name; defaults to the current user.
        #[arg(short, long)]
        account: Option<String>,
        /// Token lifetime such as `24h` or `90m`; `0s` never expires.
        #[arg(short, long = "expires-in", default_value = "0s", allow_hyphen_values = true)]
        expires_in: String,
        /// Token id; generated when omitted.
        #[arg(long)]
        id: Option<String>,
    },

    /// Print the bcrypt hash of a password, for the server's account secret.
    Bcrypt {
        /// Password to hash; read from the terminal when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a token.
    DeleteToken {
        /// Id of the token to delete.
        id: String,
        /// Account name; defaults to the current user.
        #[arg(short, long)]
        account: Option<String>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "acctl",
            "list",
            "--server",
            "cd.example.com",
            "--plaintext",
            "-o",
            "name",
        ])
        .unwrap();

        assert_eq!(cli.global.server.as_deref(), Some("cd.example.com"));
        assert!(cli.global.plaintext);
        assert!(matches!(
            cli.command,
            Command::List {
                output: OutputArgs {
                    output: OutputFormat::Name
                }
            }
        ));
    }

    #[test]
    fn test_whoami_alias_and_defaults() {
        let cli = Cli::try_parse_from(["acctl", "whoami"]).unwrap();
        assert!(matches!(cli.command, Command::GetUserInfo { .. }));
        assert_eq!(cli.global.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_generate_token_flags() {
        let cli = Cli::try_parse_from([
            "acctl",
            "generate-token",
            "-a",
            "svc",
            "-e",
            "24h",
            "--id",
            "build-123",
        ])
        .unwrap();

        match cli.command {
            Command::GenerateToken {
                account,
                expires_in,
                id,
            } => {
                assert_eq!(account.as_deref(), Some("svc"));
                assert_eq!(expires_in, "24h");
                assert_eq!(id.as_deref(), Some("build-123"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_negative_lifetime_reaches_the_parser() {
        let cli = Cli::try_parse_from(["acctl", "generate-token", "-e", "-5m"]).unwrap();
        match cli.command {
            Command::GenerateToken { expires_in, .. } => assert_eq!(expires_in, "-5m"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_update_password_flags() {
        let cli = Cli::try_parse_from([
            "acctl",
            "update-password",
            "--current-password",
            "old",
            "--new-password",
            "new",
        ])
        .unwrap();

        match cli.command {
            Command::UpdatePassword {
                account,
                current_password,
                new_password,
            } => {
                assert_eq!(account, None);
                assert_eq!(current_password.as_deref(), Some("old"));
                assert_eq!(new_password.as_deref(), Some("new"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bcrypt_password_flag() {
        let cli = Cli::try_parse_from(["acctl", "bcrypt", "--password", "admin"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Bcrypt { password: Some(ref p) } if p == "admin"
        ));
    }

    #[test]
    fn test_rejects_bad_output_and_timeout() {
        assert!(Cli::try_parse_from(["acctl", "list", "-o", "xml"]).is_err());
        assert!(Cli::try_parse_from(["acctl", "--request-timeout", "soon", "list"]).is_err());
    }

    #[test]
    fn test_can_i_requires_three_arguments() {
        assert!(Cli::try_parse_from(["acctl", "can-i", "get", "applications"]).is_err());
        let cli = Cli::try_parse_from(["acctl", "can-i", "sync", "applications", "default/app"])
            .unwrap();
        assert!(matches!(cli.command, Command::CanI { .. }));
    }
}
