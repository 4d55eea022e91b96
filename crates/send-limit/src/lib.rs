//! Rolling-window send limiting for mailgate.
//!
//! This crate keeps a persisted log of send timestamps. It counts the sends in the
//! trailing 24 hours, reports how long until the oldest of those leaves the window,
//! and records a new send once it actually happened.
//!
//! The log is a single JSON array of epoch milliseconds, shared by every caller.
//! Stale entries are pruned whenever the log is read.

#![deny(missing_docs)]

mod clock;
mod error;
mod limiter;
mod storage;
mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SendLimitError, StorageError};
pub use limiter::{SendLimitStatus, SendLimiter};
pub use storage::{FileStorage, InMemoryStorage, LogStorage, Storage};
pub use window::{LIMIT, ResetTime, Timestamp, WINDOW, WINDOW_MS, ms_to_hh_mm, prune};
