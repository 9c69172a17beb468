//! The on-disk document envelope.
//!
//! A document is an encoded scene followed by the blake3 digest of those
//! bytes. Files carry the fixed [`SUFFIX`].

use std::path::{Path, PathBuf};

use gatesim_core::Scene;

use crate::error::StorageError;
use crate::hash::{document_digest, DIGEST_LEN};

/// File suffix of saved documents, without the dot.
pub const SUFFIX: &str = "circuit";

/// Returns `true` if `path` ends in `.circuit`.
pub fn has_suffix(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SUFFIX)
}

/// Appends `.circuit` unless `path` already carries it.
pub fn with_suffix(path: &Path) -> PathBuf {
    if has_suffix(path) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(SUFFIX);
    PathBuf::from(name)
}

/// Encodes `scene` and appends its digest.
pub fn encode_document(scene: &Scene) -> Result<Vec<u8>, StorageError> {
    let mut bytes = scene.to_bytes()?;
    let digest = document_digest(&bytes);
    bytes.extend_from_slice(digest.as_bytes());
    Ok(bytes)
}

/// Verifies the digest and decodes the scene.
pub fn decode_document(bytes: &[u8]) -> Result<Scene, StorageError> {
    if bytes.len() < DIGEST_LEN {
        return Err(StorageError::Corrupted);
    }
    let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
    if document_digest(body).as_bytes() != digest {
        return Err(StorageError::Corrupted);
    }
    Ok(Scene::from_bytes(body)?)
}
