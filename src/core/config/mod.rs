//! core::config
//!
//! Configuration loading.
//!
//! # Sources
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (see [`schema`] for search locations)
//! 3. Environment (`GITHUB_TOKEN`, `GITHUB_API_URL`)
//! 4. CLI flags (applied by the caller)
//!
//! The credential only ever comes from the environment. A missing token is
//! a startup failure, never a per-call error.
//!
//! # Example
//!
//! ```no_run
//! use forge_relay::core::config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! println!("API base: {}", loaded.config.api_base);
//! ```

pub mod schema;

pub use schema::FileConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the API credential.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "GITHUB_API_URL";

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "FORGE_RELAY_CONFIG";

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default cap on concurrent blob uploads.
pub const DEFAULT_BLOB_CONCURRENCY: usize = 8;

/// Default User-Agent header value.
pub const DEFAULT_USER_AGENT: &str = concat!("forge-relay/", env!("CARGO_PKG_VERSION"));

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("{TOKEN_ENV} is not set; a GitHub token is required")]
    MissingCredential,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path of the config file, if one was found.
    pub loaded_from: Option<PathBuf>,
}

/// Effective process configuration.
#[derive(Clone)]
pub struct Config {
    /// API credential
    pub token: String,
    /// API base URL without trailing slash
    pub api_base: String,
    /// Maximum blob uploads in flight per commit
    pub blob_concurrency: usize,
    /// User-Agent header value
    pub user_agent: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_token", &!self.token.is_empty())
            .field("api_base", &self.api_base)
            .field("blob_concurrency", &self.blob_concurrency)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment and default file
    /// locations.
    ///
    /// `explicit_path` (from `--config`) takes precedence over every
    /// searched location and must exist.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if `GITHUB_TOKEN` is unset or empty
    /// - `ReadError` / `ParseError` if a config file exists but is unreadable
    /// - `InvalidValue` if a value fails validation
    pub fn load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();

        let (file, loaded_from) = match explicit_path {
            Some(path) => (Self::read_file(path)?, Some(path.to_path_buf())),
            None => match Self::find_file(&env) {
                Some(path) => (Self::read_file(&path)?, Some(path)),
                None => (FileConfig::default(), None),
            },
        };

        let config = Self::resolve(file, env)?;
        Ok(ConfigLoadResult {
            config,
            loaded_from,
        })
    }

    /// Merge a parsed file with environment values.
    ///
    /// `env` is a lookup so callers (and tests) need not touch the real
    /// process environment.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        file.validate()?;

        let token = env(TOKEN_ENV)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let api_base = match env(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(from_env) => {
                schema::validate_api_base(&from_env)?;
                from_env
            }
            None => file
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };

        Ok(Self {
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            blob_concurrency: file.blob_concurrency.unwrap_or(DEFAULT_BLOB_CONCURRENCY),
            user_agent: file
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }

    /// Search the default locations for a config file.
    fn find_file(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        // 1. $FORGE_RELAY_CONFIG
        if let Some(path) = env(CONFIG_ENV).map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        // 2. $XDG_CONFIG_HOME/forge-relay/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("forge-relay/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. ~/.forge-relay/config.toml
        dirs::home_dir()
            .map(|home| home.join(".forge-relay/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
