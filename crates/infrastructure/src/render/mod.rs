//! Rendering of command results.
//!
//! Every function returns the complete text to print on stdout.

mod table;

use acctl_application::AccountDetails;
use acctl_domain::{Account, AuthorizationDecision, Identity, OutputFormat};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::serialization::{SerializationError, to_json_stable, to_yaml};

pub use table::Table;

fn structured<T: serde::Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
) -> Option<Result<String, SerializationError>> {
    match format {
        OutputFormat::Json => Some(to_json_stable(value)),
        OutputFormat::Yaml => Some(to_yaml(value)),
        OutputFormat::Wide | OutputFormat::Name => None,
    }
}

fn field(label: &str, value: &str) -> String {
    format!("{label:<20}{value}\n")
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Renders the caller's identity.
///
/// # Errors
///
/// Returns an error if JSON or YAML serialization fails.
pub fn identity(identity: &Identity, format: OutputFormat) -> Result<String, SerializationError> {
    if let Some(out) = structured(identity, format) {
        return out;
    }
    let mut out = format!("Logged In: {}\n", identity.logged_in);
    if identity.logged_in {
        out.push_str(&format!("Username: {}\n", identity.username));
        out.push_str(&format!("Issuer: {}\n", identity.issuer));
        out.push_str(&format!("Groups: {}\n", identity.groups.join(",")));
    }
    Ok(out)
}

/// Renders an account list.
///
/// # Errors
///
/// Returns an error if JSON or YAML serialization fails.
pub fn accounts(accounts: &[Account], format: OutputFormat) -> Result<String, SerializationError> {
    if let Some(out) = structured(accounts, format) {
        return out;
    }
    if format == OutputFormat::Name {
        return Ok(accounts.iter().map(|a| format!("{}\n", a.name)).collect());
    }
    let mut table = Table::new(["NAME", "ENABLED", "CAPABILITIES"]);
    for account in accounts {
        table.push([
            account.name.clone(),
            account.enabled.to_string(),
            account.capabilities.join(", "),
        ]);
    }
    Ok(table.render())
}

/// Renders one account with its tokens.
///
/// # Errors
///
/// Returns an error if JSON or YAML serialization fails.
pub fn account_details(
    details: &AccountDetails,
    format: OutputFormat,
) -> Result<String, SerializationError> {
    let account = &details.account;
    if let Some(out) = structured(account, format) {
        return out;
    }
    if format == OutputFormat::Name {
        return Ok(format!("{}\n", account.name));
    }

    let mut out = field("Name:", &account.name);
    out.push_str(&field("Enabled:", &account.enabled.to_string()));
    out.push_str(&field("Capabilities:", &account.capabilities.join(", ")));
    out.push_str("\nTokens:\n");
    if account.tokens.is_empty() {
        out.push_str("NONE\n");
        return Ok(out);
    }

    let mut table = Table::new(["ID", "ISSUED AT", "EXPIRING AT"]);
    for (token, expired) in details.tokens() {
        let expiring = match token.expires_at {
            None => "never".to_string(),
            Some(at) if expired => format!("{} (expired)", timestamp(at)),
            Some(at) => timestamp(at),
        };
        table.push([token.id.clone(), timestamp(token.issued_at), expiring]);
    }
    out.push_str(&table.render());
    Ok(out)
}

/// Renders an authorization decision as `yes` or `no`.
#[must_use]
pub fn decision(decision: AuthorizationDecision) -> String {
    format!("{}\n", decision.as_str())
}
