//! Time source for `recorded_at` timestamps.

use chrono::{DateTime, Utc};

/// Supplies the point in time a store stamps onto committed events.
///
/// Stores read the clock once per commit, so every envelope of one commit
/// carries the same `recorded_at`.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
