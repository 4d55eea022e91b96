//! In-memory send log storage.

use std::sync::{Arc, Mutex};

use super::LogStorage;
use crate::error::StorageError;

/// In-memory storage holding the serialized log.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    contents: Arc<Mutex<Option<String>>>,
}

impl InMemoryStorage {
    /// Create an empty storage, as if nothing was ever persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// The currently persisted representation.
    pub fn contents(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a complete string, writes are a single assignment.
        self.contents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogStorage for InMemoryStorage {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents())
    }

    async fn write(&self, contents: &str) -> Result<(), StorageError> {
        *self.slot() = Some(contents.to_string());
        Ok(())
    }
}
