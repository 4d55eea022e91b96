//! Storage backends for the send log.

use std::path::Path;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::error::StorageError;

/// Trait for send log storage backends.
///
/// Backends move the raw serialized log around; parsing and pruning are the limiter's business.
#[allow(async_fn_in_trait)]
pub trait LogStorage: Send + Sync {
    /// Read the persisted log, `None` if nothing was ever stored.
    async fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the persisted log.
    async fn write(&self, contents: &str) -> Result<(), StorageError>;
}

/// Storage backend selected for a limiter.
#[derive(Debug, Clone)]
pub enum Storage {
    /// Process-local storage, lost on restart.
    Memory(InMemoryStorage),
    /// A JSON file on disk.
    File(FileStorage),
}

impl Storage {
    /// File storage at `path`.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(FileStorage::new(path))
    }

    pub(crate) async fn read(&self) -> Result<Option<String>, StorageError> {
        match self {
            Storage::Memory(storage) => storage.read().await,
            Storage::File(storage) => storage.read().await,
        }
    }

    pub(crate) async fn write(&self, contents: &str) -> Result<(), StorageError> {
        match self {
            Storage::Memory(storage) => storage.write(contents).await,
            Storage::File(storage) => storage.write(contents).await,
        }
    }
}

impl From<InMemoryStorage> for Storage {
    fn from(storage: InMemoryStorage) -> Self {
        Self::Memory(storage)
    }
}

impl From<FileStorage> for Storage {
    fn from(storage: FileStorage) -> Self {
        Self::File(storage)
    }
}
