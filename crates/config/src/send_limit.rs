//! Send limit configuration structures.

use std::path::PathBuf;

use serde::Deserialize;

/// Send limit configuration.
///
/// The limit itself (10 sends per 24 hours) is fixed, only the storage is configurable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SendLimitConfig {
    /// Where the send log is persisted.
    pub storage: SendLogStorageConfig,
}

/// Storage backend for the send log.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SendLogStorageConfig {
    /// In-memory storage, lost on restart.
    Memory,
    /// A JSON file on disk (default).
    File(FileStorageConfig),
}

impl Default for SendLogStorageConfig {
    fn default() -> Self {
        Self::File(FileStorageConfig::default())
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileStorageConfig {
    /// Path of the JSON file holding the send timestamps.
    pub path: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./email_log.json"),
        }
    }
}
