//! The trailing window and the pure arithmetic around it.

use std::{fmt, time::Duration};

/// Epoch milliseconds.
pub type Timestamp = i64;

/// Maximum number of sends allowed inside the window.
pub const LIMIT: usize = 10;

/// Length of the trailing window.
pub const WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Length of the trailing window in milliseconds.
pub const WINDOW_MS: i64 = WINDOW.as_millis() as i64;

const HOUR_MS: i64 = 60 * 60 * 1000;
const MINUTE_MS: i64 = 60 * 1000;

/// Returns the entries of `log` that are still inside the window ending at `now`.
///
/// The comparison is strict: an entry exactly `WINDOW_MS` old is dropped. Order is preserved.
pub fn prune(log: &[Timestamp], now: Timestamp) -> Vec<Timestamp> {
    log.iter().copied().filter(|ts| now.saturating_sub(*ts) < WINDOW_MS).collect()
}

/// Whole hours and minutes, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetTime {
    /// Whole hours.
    pub hours: i64,
    /// Whole minutes past the last whole hour.
    pub minutes: i64,
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Splits a millisecond duration into whole hours and minutes.
///
/// Non-positive input yields `0h 0m`. Seconds are dropped, nothing is rounded up.
pub fn ms_to_hh_mm(ms: i64) -> ResetTime {
    if ms <= 0 {
        return ResetTime::default();
    }

    ResetTime {
        hours: ms / HOUR_MS,
        minutes: (ms % HOUR_MS) / MINUTE_MS,
    }
}
