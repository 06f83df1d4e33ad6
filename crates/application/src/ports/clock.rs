//! Clock port

use chrono::{DateTime, Utc};

/// Port for reading the current time.
///
/// Token expiry is judged against this clock so tests can pin "now".
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
