//! Token lifetime parsing.
//!
//! Accepts compound duration strings such as `90s`, `1h30m`, `1.5h` or `7d`.
//! Supported units: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`, `d`.
//! An empty string and any zero duration mean the token never expires.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

static COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h|d)").expect("valid regex")
});

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// How long a newly created token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenLifetime {
    /// The token has no expiry.
    #[default]
    Never,
    /// The token expires this many whole seconds after issuance.
    Seconds(u64),
}

impl TokenLifetime {
    /// Parses an `expires-in` string.
    ///
    /// Sub-second precision is truncated, so a lifetime shorter than one
    /// second is treated as never-expiring.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NegativeDuration`] for negative input and
    /// [`DomainError::InvalidDuration`] for anything malformed.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let duration = parse_duration(input)?;
        let secs = duration.as_secs();
        if secs == 0 {
            return Ok(Self::Never);
        }
        // The wire field is a signed 64-bit integer.
        if i64::try_from(secs).is_err() {
            return Err(DomainError::InvalidDuration {
                input: input.to_string(),
                reason: "duration is too large".to_string(),
            });
        }
        Ok(Self::Seconds(secs))
    }

    /// Seconds to send on the wire; zero means no expiry.
    #[must_use]
    pub fn as_wire_seconds(self) -> i64 {
        match self {
            Self::Never => 0,
            Self::Seconds(secs) => i64::try_from(secs).unwrap_or(i64::MAX),
        }
    }

    /// Returns true if the token never expires.
    #[must_use]
    pub const fn is_never(self) -> bool {
        matches!(self, Self::Never)
    }
}

/// Parses a duration string into a non-negative [`Duration`].
///
/// # Errors
///
/// See [`TokenLifetime::parse`].
pub fn parse_duration(input: &str) -> DomainResult<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Duration::ZERO);
    }

    let invalid = |reason: &str| DomainError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (negative, mut rest) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid("missing value"));
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let captures = COMPONENT
            .captures(rest)
            .ok_or_else(|| invalid("expected <number><unit>, e.g. 30s, 12h, 7d"))?;
        let whole = &captures[0];
        let nanos = component_nanos(&captures[1], &captures[2])
            .ok_or_else(|| invalid("duration is too large"))?;
        total_nanos = total_nanos
            .checked_add(nanos)
            .ok_or_else(|| invalid("duration is too large"))?;
        rest = &rest[whole.len()..];
    }

    if negative && total_nanos > 0 {
        return Err(DomainError::NegativeDuration(input.to_string()));
    }

    let secs = u64::try_from(total_nanos / NANOS_PER_SECOND)
        .map_err(|_| invalid("duration is too large"))?;
    // Remainder is always below one second.
    #[allow(clippy::cast_possible_truncation)]
    let subsec = (total_nanos % NANOS_PER_SECOND) as u32;
    Ok(Duration::new(secs, subsec))
}

fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SECOND,
        "m" => 60 * NANOS_PER_SECOND,
        "h" => 3_600 * NANOS_PER_SECOND,
        _ => 86_400 * NANOS_PER_SECOND,
    }
}

fn component_nanos(number: &str, unit: &str) -> Option<u128> {
    let scale = unit_nanos(unit);
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let mut nanos = int_value.checked_mul(scale)?;

    if !frac_part.is_empty() {
        // Extra digits cannot change the result at nanosecond resolution.
        let digits = &frac_part[..frac_part.len().min(18)];
        let frac_value: u128 = digits.parse().ok()?;
        let divisor = 10u128.checked_pow(u32::try_from(digits.len()).ok()?)?;
        nanos = nanos.checked_add(frac_value.checked_mul(scale)? / divisor)?;
    }
    Some(nanos)
}
