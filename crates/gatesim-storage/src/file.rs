//! Filesystem implementation of [`DocumentStore`].
//!
//! Writes go to a temporary file in the target's directory that is renamed
//! over the target. A failed save leaves neither a half-written document nor
//! the temporary file behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::traits::DocumentStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        FileStore
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl DocumentStore for FileStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            _ => io_error(path, e),
        })
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
                parent
            }
            None => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        tmp.write_all(bytes).map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| io_error(path, e.error))?;
        tracing::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
