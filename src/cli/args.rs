//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--cwd <path>`: Discover the local git repository from here
//! - `--config <path>`: Read this config file instead of searching
//! - `--api-url <url>`: Override the API base URL
//! - `--blob-concurrency <n>`: Cap on concurrent blob uploads
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Log warnings and errors only

use clap::Parser;
use std::path::PathBuf;

/// forge-relay - commit to GitHub repositories over a JSON-RPC tool interface
#[derive(Parser, Debug)]
#[command(name = "forge-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if forge-relay was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config file and GITHUB_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Maximum blob uploads in flight per commit
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub blob_concurrency: Option<u16>,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    pub debug: bool,

    /// Log warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["forge-relay"]).unwrap();
        assert!(cli.cwd.is_none());
        assert!(!cli.debug);
        assert!(!cli.quiet);
    }

    #[test]
    fn all_flags_parse() {
        let cli = Cli::try_parse_from([
            "forge-relay",
            "--cwd",
            "/tmp/repo",
            "--config",
            "/tmp/c.toml",
            "--api-url",
            "https://ghe.example.com/api/v3",
            "--blob-concurrency",
            "4",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(cli.blob_concurrency, Some(4));
        assert!(cli.debug);
    }

    #[test]
    fn zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["forge-relay", "--blob-concurrency", "0"]).is_err());
    }

    #[test]
    fn debug_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["forge-relay", "--debug", "--quiet"]).is_err());
    }
}
