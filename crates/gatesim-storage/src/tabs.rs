//! Open documents ("tabs").
//!
//! [`Tabs`] owns every open [`Document`] plus the index of the active one.
//! Each document tracks the path it was loaded from or saved to and whether
//! its scene changed since the last successful write. Handing out the active
//! scene mutably clears that flag, so callers never mark edits by hand.

use std::path::{Path, PathBuf};

use gatesim_core::{Scene, SceneMeta};

use crate::document::{decode_document, encode_document, with_suffix};
use crate::error::StorageError;
use crate::library::Library;
use crate::traits::DocumentStore;
use crate::types::DocumentInfo;

/// One open scene with its save state.
#[derive(Debug, Clone)]
pub struct Document {
    scene: Scene,
    path: Option<PathBuf>,
    saved: bool,
}

impl Document {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo::new(&self.scene, self.path.clone(), self.saved)
    }
}

/// The set of open documents backed by a [`DocumentStore`].
pub struct Tabs<S> {
    store: S,
    docs: Vec<Document>,
    active: Option<usize>,
    /// Active index as of the last `is_changed` call.
    seen: Option<usize>,
}

impl<S: DocumentStore> Tabs<S> {
    pub fn new(store: S) -> Self {
        Tabs {
            store,
            docs: Vec::new(),
            active: None,
            seen: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn push(&mut self, doc: Document) -> usize {
        self.docs.push(doc);
        let index = self.docs.len() - 1;
        self.active = Some(index);
        index
    }

    /// Opens an empty, unsaved scene and makes it active.
    pub fn create(&mut self, meta: SceneMeta) -> Result<usize, StorageError> {
        let scene = Scene::with_meta(meta)?;
        tracing::info!("created document {}", scene.name());
        Ok(self.push(Document {
            scene,
            path: None,
            saved: false,
        }))
    }

    /// Opens the document at `path` and makes it active. A path that is
    /// already open is re-selected instead of loaded twice.
    pub fn open(&mut self, path: &Path) -> Result<usize, StorageError> {
        if let Some(index) = self.docs.iter().position(|d| d.path() == Some(path)) {
            self.active = Some(index);
            return Ok(index);
        }
        let bytes = self.store.read(path)?;
        let scene = decode_document(&bytes).map_err(|err| match err {
            StorageError::Core(core) => StorageError::InvalidFile {
                path: path.to_path_buf(),
                reason: core.to_string(),
            },
            other => other,
        })?;
        tracing::info!("opened {} from {}", scene.name(), path.display());
        Ok(self.push(Document {
            scene,
            path: Some(path.to_path_buf()),
            saved: true,
        }))
    }

    fn resolve(&self, index: Option<usize>) -> Result<usize, StorageError> {
        match index.or(self.active) {
            Some(i) if i < self.docs.len() => Ok(i),
            Some(i) => Err(StorageError::InvalidTab(i)),
            None => Err(StorageError::NoActiveTab),
        }
    }

    /// Closes a document (the active one by default) and returns it.
    pub fn close(&mut self, index: Option<usize>) -> Result<Document, StorageError> {
        let index = self.resolve(index)?;
        let doc = self.docs.remove(index);
        self.active = match self.active {
            _ if self.docs.is_empty() => None,
            Some(a) if a > index => Some(a - 1),
            Some(a) => Some(a.min(self.docs.len() - 1)),
            None => None,
        };
        tracing::info!("closed {}", doc.scene.name());
        Ok(doc)
    }

    /// Writes a document to its path. Does nothing if it is already saved.
    pub fn save(&mut self, index: Option<usize>) -> Result<(), StorageError> {
        let index = self.resolve(index)?;
        if self.docs[index].saved {
            return Ok(());
        }
        self.write(index)
    }

    fn write(&mut self, index: usize) -> Result<(), StorageError> {
        let doc = &self.docs[index];
        let path = doc.path.clone().ok_or(StorageError::NoSavePathDefined)?;
        let bytes = encode_document(&doc.scene)?;
        self.store.write(&path, &bytes)?;
        self.docs[index].saved = true;
        tracing::info!("saved {} to {}", self.docs[index].scene.name(), path.display());
        Ok(())
    }

    /// Writes a document to a new path, appending the document suffix if
    /// missing, and returns the path used. On failure the previous path is
    /// kept.
    pub fn save_as(&mut self, path: &Path, index: Option<usize>) -> Result<PathBuf, StorageError> {
        let index = self.resolve(index)?;
        let path = with_suffix(path);
        let previous = self.docs[index].path.replace(path.clone());
        if let Err(err) = self.write(index) {
            self.docs[index].path = previous;
            return Err(err);
        }
        Ok(path)
    }

    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|i| self.docs.get(i))
    }

    /// The active scene for editing. Marks the document unsaved.
    pub fn active_mut(&mut self) -> Option<&mut Scene> {
        let doc = self.docs.get_mut(self.active?)?;
        doc.saved = false;
        Some(&mut doc.scene)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn select(&mut self, index: usize) -> Result<(), StorageError> {
        if index >= self.docs.len() {
            return Err(StorageError::InvalidTab(index));
        }
        self.active = Some(index);
        Ok(())
    }

    pub fn is_saved(&self, index: Option<usize>) -> Result<bool, StorageError> {
        let index = self.resolve(index)?;
        Ok(self.docs[index].saved)
    }

    /// Returns `true` once after every change of the active index.
    pub fn is_changed(&mut self) -> bool {
        let changed = self.active != self.seen;
        self.seen = self.active;
        changed
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.docs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Loads `dependency` from `library` into the active scene and returns
    /// its dependency index. An already included dependency is reused.
    pub fn include<L: DocumentStore>(
        &mut self,
        library: &Library<L>,
        dependency: &str,
    ) -> Result<usize, StorageError> {
        let index = self.resolve(None)?;
        if let Some(existing) = self.docs[index].scene.find_dependency(dependency) {
            return Ok(existing);
        }
        let component = library.load(dependency)?;
        let doc = &mut self.docs[index];
        doc.saved = false;
        Ok(doc.scene.add_dependency(component))
    }
}
