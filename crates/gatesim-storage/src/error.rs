//! Storage error types for gatesim-storage.
//!
//! [`StorageError`] covers every failure of the document layer: I/O,
//! missing or malformed files, checksum mismatches, tab bookkeeping, and
//! core errors raised while decoding or editing a scene.

use std::path::PathBuf;

use gatesim_core::CoreError;
use thiserror::Error;

/// Errors produced by document and library operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A core operation failed, including decoding a scene block.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No document exists at the given path.
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not a document this layer can open.
    #[error("invalid document {}: {reason}", .path.display())]
    InvalidFile { path: PathBuf, reason: String },

    /// `save` was called on a document that has never been saved.
    #[error("no save path defined")]
    NoSavePathDefined,

    /// No open document at the given index.
    #[error("no tab at index {0}")]
    InvalidTab(usize),

    /// No document is open.
    #[error("no active document")]
    NoActiveTab,

    /// The stored checksum does not match the document contents.
    #[error("document checksum mismatch")]
    Corrupted,
}
