//! Error types for send limiting.

use std::path::PathBuf;

/// Errors raised by a log storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be read or written.
    #[error("send log at {path} is unavailable: {source}")]
    Unavailable {
        /// Location of the backing store.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The persisted representation is not a JSON array of timestamps.
    #[error("send log is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors surfaced to callers of the send limiter.
///
/// Corruption never shows up here, the limiter recovers from it by resetting the log.
#[derive(Debug, thiserror::Error)]
pub enum SendLimitError {
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The log could not be serialized for writing.
    #[error("Failed to encode the send log: {0}")]
    Encode(#[source] serde_json::Error),
}
