//! fibfork configuration
//!
//! Loaded from a TOML file when `--config` is given. Every key is optional:
//!
//! ```toml
//! prompt = true        # print "Enter the number of Fibonacci terms: "
//! overflow = "wrap"    # or "saturate"
//! log = "warn"         # tracing filter used when RUST_LOG is unset
//! ```

use crate::error::ConfigError;
use fibfork_core::Overflow;
use serde::Deserialize;
use std::path::Path;

/// Default tracing filter
pub const DEFAULT_LOG: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Print the input prompt before reading the term count
    pub prompt: bool,
    /// Arithmetic used by the child's Fibonacci recurrence
    pub overflow: Overflow,
    /// Tracing filter directive
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: true,
            overflow: Overflow::Wrap,
            log: DEFAULT_LOG.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
