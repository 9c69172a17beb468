//! The component library: installed component scenes addressed by their
//! dependency string.
//!
//! Each entry is an ordinary document stored as
//! `<dir>/<hex blake3 of author/name/version>.circuit`.

use std::path::{Path, PathBuf};

use gatesim_core::{parse_dependency, CoreError, Scene};

use crate::document::{decode_document, encode_document, SUFFIX};
use crate::error::StorageError;
use crate::hash::dependency_key;
use crate::traits::DocumentStore;

pub struct Library<S> {
    store: S,
    dir: PathBuf,
}

impl<S: DocumentStore> Library<S> {
    pub fn new(store: S, dir: impl Into<PathBuf>) -> Self {
        Library {
            store,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `dependency`.
    pub fn entry_path(&self, dependency: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", dependency_key(dependency), SUFFIX))
    }

    /// Stores a component scene under its dependency string and returns the
    /// path written.
    pub fn install(&mut self, scene: &Scene) -> Result<PathBuf, StorageError> {
        if !scene.is_component() {
            return Err(CoreError::NotAComponent.into());
        }
        let dependency = scene.to_dependency();
        let path = self.entry_path(&dependency);
        self.store.write(&path, &encode_document(scene)?)?;
        tracing::info!("installed {} as {}", dependency, path.display());
        Ok(path)
    }

    pub fn contains(&self, dependency: &str) -> bool {
        self.store.exists(&self.entry_path(dependency))
    }

    /// Loads the component installed under `dependency`.
    pub fn load(&self, dependency: &str) -> Result<Scene, StorageError> {
        parse_dependency(dependency)?;
        let path = self.entry_path(dependency);
        let scene = decode_document(&self.store.read(&path)?)?;
        if scene.to_dependency() != dependency {
            return Err(StorageError::InvalidFile {
                path,
                reason: format!("holds {} instead of {}", scene.to_dependency(), dependency),
            });
        }
        if !scene.is_component() {
            return Err(CoreError::NotAComponent.into());
        }
        Ok(scene)
    }
}
