//! The `gatesim` command-line shell.
//!
//! # Modules
//!
//! - [`config`]: flags and environment resolved into [`Config`]
//! - [`command`]: the command table, line matching and argument parsing
//! - [`shell`]: [`Shell`], which executes command lines against open documents
//! - [`error`]: ShellError enum

pub mod command;
pub mod config;
pub mod error;
pub mod shell;

pub use config::Config;
pub use error::ShellError;
pub use shell::Shell;
