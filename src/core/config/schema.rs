//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! Searched in order:
//! 1. `--config <path>`
//! 2. `$FORGE_RELAY_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/forge-relay/config.toml`
//! 4. `~/.forge-relay/config.toml`
//!
//! # Validation
//!
//! Values are validated after parsing, so a bad file fails at startup
//! rather than on the first tool call.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// api_base = "https://github.example.com/api/v3"
/// blob_concurrency = 4
/// user_agent = "my-agent"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// API base URL (GitHub Enterprise)
    pub api_base: Option<String>,

    /// Maximum number of blob uploads in flight per commit
    pub blob_concurrency: Option<usize>,

    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            validate_api_base(base)?;
        }

        if self.blob_concurrency == Some(0) {
            return Err(ConfigError::InvalidValue(
                "blob_concurrency must be at least 1".into(),
            ));
        }

        if let Some(agent) = &self.user_agent {
            if agent.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "user_agent cannot be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Check that an API base is an http(s) URL.
pub(crate) fn validate_api_base(base: &str) -> Result<(), ConfigError> {
    if base.starts_with("https://") || base.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "api_base '{}' must start with http:// or https://",
            base
        )))
    }
}
