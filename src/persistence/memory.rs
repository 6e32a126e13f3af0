//! In-memory store with the same record layout as the IndexedDB one

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{DocumentStore, SavedDocument};
use crate::consts::{CONTENT_KEY, OVERLAY_KEY};
use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Record {
    Content(Vec<u8>),
    Overlay(String),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<&'static str, Record>>,
    saves: Cell<usize>,
    failure: RefCell<Option<StorageError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed `save` calls since creation
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Make every operation fail with `error` until reset with `None`
    pub fn set_failure(&self, error: Option<StorageError>) {
        *self.failure.borrow_mut() = error;
    }

    /// Synchronous view of the stored session
    pub fn snapshot(&self) -> Option<SavedDocument> {
        let records = self.records.borrow();
        let content = match records.get(CONTENT_KEY) {
            Some(Record::Content(bytes)) => bytes.clone(),
            _ => return None,
        };
        let overlay = match records.get(OVERLAY_KEY) {
            Some(Record::Overlay(text)) => text.clone(),
            _ => String::new(),
        };
        Some(SavedDocument { content, overlay })
    }

    fn check(&self) -> Result<(), StorageError> {
        match self.failure.borrow().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn save(&self, content: &[u8], overlay: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut records = self.records.borrow_mut();
        records.insert(CONTENT_KEY, Record::Content(content.to_vec()));
        records.insert(OVERLAY_KEY, Record::Overlay(overlay.to_string()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    async fn load(&self) -> Result<Option<SavedDocument>, StorageError> {
        self.check()?;
        Ok(self.snapshot())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        self.records.borrow_mut().clear();
        Ok(())
    }
}
