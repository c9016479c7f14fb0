//! cli::logging
//!
//! Log verbosity and subscriber setup.
//!
//! Logs always go to stderr. Stdout carries protocol messages and nothing
//! else.

use tracing_subscriber::EnvFilter;

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    /// Informational messages
    Normal,
    /// Everything from this crate, including pipeline stages
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default filter directive for this level.
    pub fn directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Debug => "forge_relay=debug,info",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn directives_parse() {
        for v in [Verbosity::Quiet, Verbosity::Normal, Verbosity::Debug] {
            assert!(EnvFilter::try_new(v.directive()).is_ok());
        }
    }
}
