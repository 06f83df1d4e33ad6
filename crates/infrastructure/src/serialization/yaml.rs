//! YAML serialization helpers.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SerializationError;

/// Serializes a value to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, SerializationError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Deserializes YAML from bytes. Empty input yields the type's default.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or doesn't match the expected type.
pub fn from_yaml_bytes<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, SerializationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_slice(bytes)?)
}
