//! Document layer for gatesim scenes.
//!
//! Provides the [`DocumentStore`] trait defining where document bytes live,
//! plus the [`FileStore`] and [`InMemoryStore`] backends, the checksummed
//! document envelope, the [`Tabs`] set of open documents and the component
//! [`Library`].
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`hash`]: blake3 document digests and library keys
//! - [`document`]: envelope encode/decode and the `.circuit` suffix
//! - [`traits`]: DocumentStore trait definition
//! - [`file`]: FileStore implementation
//! - [`memory`]: InMemoryStore implementation
//! - [`tabs`]: open documents, save state and the active-index edge detector
//! - [`library`]: installed components keyed by dependency string
//! - [`types`]: DocumentInfo summaries

pub mod document;
pub mod error;
pub mod file;
pub mod hash;
pub mod library;
pub mod memory;
pub mod tabs;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use document::{decode_document, encode_document, has_suffix, with_suffix, SUFFIX};
pub use error::StorageError;
pub use file::FileStore;
pub use library::Library;
pub use memory::InMemoryStore;
pub use tabs::{Document, Tabs};
pub use traits::DocumentStore;
pub use types::{Boundary, DocumentInfo};
