//! Serialization helpers for rendered output and the local config file.
//!
//! JSON output is deterministic: 2-space indentation and a trailing newline.
//! YAML goes through `serde_yaml` for both reading and writing.

mod json;
mod yaml;

pub use json::*;
pub use yaml::*;
