//! Wall-clock timestamps for the audit log.
//!
//! The audit log format is inherited from the original server's logger:
//! `HH:MM:SS, DD.MM.YY`, local time, zero-padded. [`Timestamp::now`] captures
//! one instant; [`Timestamp::format`] renders it in that exact shape.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Datelike, Local, TimeZone, Timelike};

/// Milliseconds since the Unix epoch. Used for ordering and duration math
/// where a full calendar breakdown isn't needed.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A point in time captured for audit-log records.
///
/// Deliberately a thin wrapper around a Unix-epoch second count rather than
/// `SystemTime` directly: the audit log only ever needs to format it and
/// compute a duration against another `Timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Captures the current instant.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self(secs)
    }

    /// Whole seconds elapsed from `self` to `other`. Negative if `other`
    /// precedes `self`.
    #[must_use]
    pub fn elapsed_secs_until(&self, other: Timestamp) -> i64 {
        other.0 - self.0
    }

    /// Renders as `HH:MM:SS, DD.MM.YY` in local time, matching the original
    /// server's log format exactly (zero-padded, two-digit year).
    #[must_use]
    pub fn format(&self) -> String {
        let dt = Local.timestamp_opt(self.0, 0).single().unwrap_or_else(Local::now);
        format!(
            "{:02}:{:02}:{:02}, {:02}.{:02}.{:02}",
            dt.hour(),
            dt.minute(),
            dt.second(),
            dt.day(),
            dt.month(),
            dt.year() % 100,
        )
    }
}
