//! Configuration import and export.
//!
//! The JSON shape is the one produced by the settings export:
//!
//! ```json
//! {
//!   "any": { "action": "prune", "referer": "" },
//!   "same": { "action": "keep", "referer": "" },
//!   "domains": [
//!     { "domain": "example.com", "action": "replace", "referer": "https://example.com/" },
//!     { "domain": "cdn.test", "origin": "example.com", "action": "keep", "referer": "" }
//!   ]
//! }
//! ```
//!
//! Parsing only checks the shape. Domains and actions are validated when
//! the configuration is compiled.

use std::fs;
use std::path::Path;

use crate::error::{RefererError, Result};
use crate::types::RefererConfig;

/// Parse a configuration from JSON text.
///
/// Missing `any`/`same` fall back to the defaults, unknown keys are ignored.
pub fn parse_config(text: &str) -> Result<RefererConfig> {
    serde_json::from_str(text).map_err(|e| {
        RefererError::ParseError(format!(
            "invalid configuration at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        ))
    })
}

/// Parse a configuration from a JSON file.
pub fn parse_config_from_file(path: impl AsRef<Path>) -> Result<RefererConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        RefererError::ParseError(format!(
            "failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_config(&text)
}

/// Serialize a configuration as pretty-printed JSON.
pub fn export_config(config: &RefererConfig) -> Result<String> {
    serde_json::to_string_pretty(config)
        .map_err(|e| RefererError::ParseError(format!("failed to export configuration: {}", e)))
}
