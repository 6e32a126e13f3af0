//! Durable storage for the saved session
//!
//! Exactly one saved document lives in the store, split across two records:
//! - document content (binary)
//! - annotation overlay (XFDF text)
//!
//! Both records are written and cleared in a single transaction. A session exists only
//! when the content record does; a lone overlay is ignored.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod indexed_db;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use indexed_db::IndexedDbStore;

use crate::error::StorageError;

/// A restored (or about to be stored) session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    /// Document bytes
    pub content: Vec<u8>,
    /// Serialized annotations; empty means no annotations
    pub overlay: String,
}

impl SavedDocument {
    pub fn new(content: impl Into<Vec<u8>>, overlay: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            overlay: overlay.into(),
        }
    }

    pub fn has_overlay(&self) -> bool {
        !self.overlay.is_empty()
    }
}

/// Key-value store holding at most one [`SavedDocument`]
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Upsert content and overlay atomically
    async fn save(&self, content: &[u8], overlay: &str) -> Result<(), StorageError>;

    /// `None` when no content record exists
    async fn load(&self) -> Result<Option<SavedDocument>, StorageError>;

    /// Remove both records atomically
    async fn clear(&self) -> Result<(), StorageError>;
}
