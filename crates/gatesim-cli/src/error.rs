//! Shell error types.
//!
//! [`ShellError`] wraps the core and storage errors a command can surface
//! and adds the failures that only exist at the command line: no open
//! scene, a scene already open, and lines that match no command.

use gatesim_core::CoreError;
use gatesim_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The command needs an open scene.
    #[error("no active scene; use `new` or `open` first")]
    NoScene,

    /// `new` or `open` while a scene is already active.
    #[error("scene {0} is already open; `close` it first")]
    AlreadyActiveScene(String),

    #[error("unrecognized command <{0}>, see `help`")]
    UnknownCommand(String),

    /// A positional file without the document suffix.
    #[error("{0} is not a .circuit document")]
    InvalidFile(String),

    /// `info` could not render its JSON summary.
    #[error("failed to serialize document info: {0}")]
    Json(#[from] serde_json::Error),
}
