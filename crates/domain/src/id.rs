//! Token identifier generation.

use uuid::Uuid;

/// Generates an identifier for a token whose caller supplied none.
///
/// UUID v7 embeds the creation time, so generated ids sort by issuance.
#[must_use]
pub fn generate_token_id() -> String {
    Uuid::now_v7().to_string()
}

/// Returns the caller-supplied id, or a generated one when it is absent or blank.
#[must_use]
pub fn token_id_or_generate(id: Option<&str>) -> String {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => generate_token_id(),
    }
}
