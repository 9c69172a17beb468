//! In-memory implementation of [`DocumentStore`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::traits::DocumentStore;

/// Documents kept in a map keyed by path.
///
/// A store can be made read-only to exercise write failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    files: HashMap<PathBuf, Vec<u8>>,
    read_only: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Raw access for tests that tamper with stored bytes.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Vec<u8>> {
        self.files.get_mut(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DocumentStore for InMemoryStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "store is read-only",
                ),
            });
        }
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
