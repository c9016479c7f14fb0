//! cli
//!
//! Process entry point for forge-relay.
//!
//! # Responsibilities
//!
//! - Parse flags and install logging
//! - Load configuration; a missing credential stops the process here
//! - Build the GitHub forge and serve the tool interface on stdio
//!
//! # Architecture
//!
//! The CLI layer is thin. Everything it builds is handed to
//! [`crate::server`], which dispatches to [`crate::tools`].

pub mod args;
pub mod logging;

pub use args::Cli;
pub use logging::Verbosity;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::config::{schema, Config};
use crate::forge::github::GitHubForge;
use crate::server::Server;
use crate::tools::Toolbox;

/// Run the server.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(Verbosity::from_flags(cli.quiet, cli.debug));

    let config = load_config(&cli)?;
    tracing::debug!(?config, "configuration loaded");

    let workdir = workdir(cli.cwd.clone())?;

    let forge = GitHubForge::from_config(&config);
    let toolbox = Toolbox::new(Arc::new(forge), workdir)
        .with_blob_concurrency(config.blob_concurrency);
    let server = Server::new(toolbox);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime
        .block_on(server.serve_stdio())
        .context("stdio transport failed")
}

/// Load config and apply flag overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let loaded = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &loaded.loaded_from {
        tracing::debug!(path = %path.display(), "read config file");
    }

    let mut config = loaded.config;
    if let Some(url) = &cli.api_url {
        schema::validate_api_base(url)?;
        config.api_base = url.trim_end_matches('/').to_string();
    }
    if let Some(limit) = cli.blob_concurrency {
        config.blob_concurrency = usize::from(limit);
    }
    Ok(config)
}

/// Directory used for local identity discovery.
fn workdir(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to read current directory"),
    }
}
