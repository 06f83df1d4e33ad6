//! Accounts and their scoped tokens.
//!
//! These are transient projections of remote state; the client never caches
//! them across invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::TokenLifetime;

/// A remote account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account name.
    pub name: String,
    /// Whether the account may log in.
    #[serde(default)]
    pub enabled: bool,
    /// Capabilities granted to the account. Informational only.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Tokens issued for the account, in server order.
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Account {
    /// Creates an enabled account without capabilities or tokens.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            capabilities: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Looks up a token by id.
    #[must_use]
    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// Returns true if the account holds a token with this id.
    #[must_use]
    pub fn has_token(&self, id: &str) -> bool {
        self.token(id).is_some()
    }
}

/// A scoped, long-lived access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Identifier, unique within the owning account.
    pub id: String,
    /// When the token was issued.
    #[serde(with = "epoch_seconds")]
    pub issued_at: DateTime<Utc>,
    /// When the token expires; `None` means never.
    #[serde(
        default,
        with = "optional_epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Creates a token issued at `issued_at` with the given lifetime.
    ///
    /// Timestamps are truncated to whole seconds.
    #[must_use]
    pub fn issue(id: impl Into<String>, issued_at: DateTime<Utc>, lifetime: TokenLifetime) -> Self {
        let issued_at = truncate_to_seconds(issued_at);
        let expires_at = match lifetime {
            TokenLifetime::Never => None,
            TokenLifetime::Seconds(secs) => Some(
                i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
        };
        Self {
            id: id.into(),
            issued_at,
            expires_at,
        }
    }

    /// Returns true if the token has an expiry that lies before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Returns true if the token never expires.
    #[must_use]
    pub const fn never_expires(&self) -> bool {
        self.expires_at.is_none()
    }
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

/// Wire representation of a 64-bit timestamp: either a JSON number or a
/// decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireInt64 {
    Number(i64),
    Text(String),
}

impl WireInt64 {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) if s.is_empty() => Ok(0),
            Self::Text(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid int64 value: {s}"))),
        }
    }
}

fn from_epoch<E: serde::de::Error>(secs: i64) -> Result<DateTime<Utc>, E> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| E::custom(format!("timestamp out of range: {secs}")))
}

mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{WireInt64, from_epoch};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(at.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let secs = WireInt64::deserialize(deserializer)?.into_i64::<D::Error>()?;
        from_epoch(secs)
    }
}

mod optional_epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{WireInt64, from_epoch};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(at.map_or(0, |at| at.timestamp()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let secs = match Option::<WireInt64>::deserialize(deserializer)? {
            Some(value) => value.into_i64::<D::Error>()?,
            None => 0,
        };
        if secs <= 0 {
            return Ok(None);
        }
        from_epoch(secs).map(Some)
    }
}
