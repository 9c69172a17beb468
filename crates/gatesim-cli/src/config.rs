//! Startup configuration.
//!
//! Resolved once from command-line flags and the environment:
//! - `GATESIM_LIBRARY`: component library directory
//!   (default: `$HOME/.local/share/gatesim/pkg`)
//! - `GATESIM_LOG`: `tracing` filter directive (default: `info`, or
//!   `debug` with `--verbose`)
//!
//! Flags override the environment; the environment overrides defaults.

use std::path::PathBuf;

pub const LIBRARY_ENV: &str = "GATESIM_LIBRARY";
pub const LOG_ENV: &str = "GATESIM_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub library: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Resolves the configuration against the process environment.
    pub fn from_env(library: Option<PathBuf>, verbose: bool) -> Self {
        Self::resolve(library, verbose, |key| std::env::var(key).ok())
    }

    /// Resolves the configuration with `env` standing in for the process
    /// environment.
    pub fn resolve<F>(library: Option<PathBuf>, verbose: bool, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let library = library
            .or_else(|| non_empty(LIBRARY_ENV).map(PathBuf::from))
            .unwrap_or_else(|| {
                non_empty("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_default()
                    .join(".local/share/gatesim/pkg")
            });
        let log_filter = non_empty(LOG_ENV).unwrap_or_else(|| {
            if verbose { "debug" } else { "info" }.to_string()
        });
        Config {
            library,
            log_filter,
        }
    }
}
