//! Content hashing with blake3.
//!
//! Documents carry a blake3 digest of their scene bytes so truncated or
//! edited files are caught before decoding. Library entries are named after
//! the digest of their dependency string, which keeps arbitrary author and
//! scene names out of file names.

/// Length in bytes of a document digest.
pub const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Digest of encoded scene bytes.
pub fn document_digest(bytes: &[u8]) -> blake3::Hash {
    blake3::hash(bytes)
}

/// Library key of a dependency string (`author/name/version`): the hex
/// digest of its bytes.
pub fn dependency_key(dependency: &str) -> String {
    blake3::hash(dependency.as_bytes()).to_hex().to_string()
}
