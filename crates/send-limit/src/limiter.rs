//! The send limiter.

use config::{SendLimitConfig, SendLogStorageConfig};
use tokio::sync::Mutex;

use crate::error::{SendLimitError, StorageError};
use crate::storage::{InMemoryStorage, Storage};
use crate::window::{LIMIT, ResetTime, Timestamp, WINDOW_MS, ms_to_hh_mm, prune};

/// Snapshot of the limiter as seen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendLimitStatus {
    /// Sends inside the window.
    pub count: usize,
    /// Maximum sends inside the window.
    pub limit: usize,
    /// Sends still allowed right now.
    pub remaining: usize,
    /// Milliseconds until capacity frees up, zero while under the limit.
    pub reset_in_ms: i64,
    /// `reset_in_ms` in whole hours and minutes.
    pub reset_in: ResetTime,
}

/// Persisted, time-windowed counter of sends.
///
/// Callers decide admission themselves: check [`SendLimiter::count`] against [`LIMIT`],
/// perform the send, then [`SendLimiter::record`] it. Each call is a read-modify-write of
/// the persisted log under an internal lock, the sequence of calls is not atomic.
pub struct SendLimiter {
    storage: Storage,
    lock: Mutex<()>,
}

impl SendLimiter {
    /// Create a limiter with the configured storage backend.
    pub fn new(config: &SendLimitConfig) -> Self {
        let storage = match &config.storage {
            SendLogStorageConfig::Memory => Storage::Memory(InMemoryStorage::new()),
            SendLogStorageConfig::File(file) => Storage::file(&file.path),
        };

        Self::with_storage(storage)
    }

    /// Create a limiter on top of an explicit storage backend.
    pub fn with_storage(storage: impl Into<Storage>) -> Self {
        Self {
            storage: storage.into(),
            lock: Mutex::new(()),
        }
    }

    /// Maximum sends inside the window.
    pub fn limit(&self) -> usize {
        LIMIT
    }

    /// The persisted timestamps, unpruned.
    ///
    /// A missing log is initialized to `[]`. A corrupt one is reset to `[]` and reads as empty.
    pub async fn load(&self) -> Result<Vec<Timestamp>, SendLimitError> {
        let _guard = self.lock.lock().await;
        self.load_unlocked().await
    }

    /// Number of sends inside the window ending at `now`.
    ///
    /// The pruned log is written back so the persisted log stays bounded.
    pub async fn count(&self, now: Timestamp) -> Result<usize, SendLimitError> {
        let _guard = self.lock.lock().await;
        self.count_unlocked(now).await
    }

    /// Milliseconds until the oldest counted send leaves the window.
    ///
    /// Zero when under the limit; a reset time is meaningless then.
    pub async fn time_until_reset(&self, now: Timestamp) -> Result<i64, SendLimitError> {
        let _guard = self.lock.lock().await;
        self.time_until_reset_unlocked(now).await
    }

    /// Record a send at `now`. Call this only after the send succeeded.
    pub async fn record(&self, now: Timestamp) -> Result<(), SendLimitError> {
        let _guard = self.lock.lock().await;

        let mut log = prune(&self.load_unlocked().await?, now);
        log.push(now);
        self.save(&log).await?;

        log::debug!("Recorded send at {now}, {} sends in window", log.len());

        Ok(())
    }

    /// Count and reset time taken together.
    pub async fn status(&self, now: Timestamp) -> Result<SendLimitStatus, SendLimitError> {
        let _guard = self.lock.lock().await;

        let count = self.count_unlocked(now).await?;
        let reset_in_ms = self.time_until_reset_unlocked(now).await?;

        Ok(SendLimitStatus {
            count,
            limit: LIMIT,
            remaining: LIMIT.saturating_sub(count),
            reset_in_ms,
            reset_in: ms_to_hh_mm(reset_in_ms),
        })
    }

    async fn count_unlocked(&self, now: Timestamp) -> Result<usize, SendLimitError> {
        let log = prune(&self.load_unlocked().await?, now);
        self.save(&log).await?;

        Ok(log.len())
    }

    async fn time_until_reset_unlocked(&self, now: Timestamp) -> Result<i64, SendLimitError> {
        let log = prune(&self.load_unlocked().await?, now);

        match log.first() {
            Some(oldest) if log.len() >= LIMIT => Ok(WINDOW_MS.saturating_sub(now.saturating_sub(*oldest))),
            _ => Ok(0),
        }
    }

    async fn load_unlocked(&self) -> Result<Vec<Timestamp>, SendLimitError> {
        let Some(contents) = self.storage.read().await? else {
            log::debug!("No send log found, initializing an empty one");
            self.save(&[]).await?;

            return Ok(Vec::new());
        };

        let contents = contents.trim();

        if contents.is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Timestamp>>(contents) {
            Ok(log) => Ok(log),
            Err(err) => {
                log::error!("{}. Resetting the send log to [].", StorageError::Corrupt(err));
                self.save(&[]).await?;

                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, log: &[Timestamp]) -> Result<(), SendLimitError> {
        let contents = serde_json::to_string_pretty(log).map_err(SendLimitError::Encode)?;
        self.storage.write(&contents).await?;

        Ok(())
    }
}
