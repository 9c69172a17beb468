//! The [`DocumentStore`] trait: where document bytes live.
//!
//! Tabs and the component library only ever move whole documents, so the
//! contract is three path-keyed operations. [`FileStore`](crate::file::FileStore)
//! backs real sessions; [`InMemoryStore`](crate::memory::InMemoryStore) backs
//! tests and scratch sessions. Both are swappable without touching the
//! document logic.

use std::path::Path;

use crate::error::StorageError;

pub trait DocumentStore {
    /// Reads the whole document at `path`.
    ///
    /// Fails with [`StorageError::NotFound`] when nothing is stored there.
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    /// Replaces the document at `path` with `bytes`.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), StorageError>;

    fn exists(&self, path: &Path) -> bool;
}
