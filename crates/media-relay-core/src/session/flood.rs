//! Flood-wait arithmetic.

use chrono::{DateTime, Local, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;

/// A provider-imposed wait before the next authentication attempt.
///
/// `available_at` is fixed when the condition is observed; later checks
/// recompute `remaining_seconds` from it rather than from a stale `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FloodWait {
    /// Whole seconds left to wait
    pub remaining_seconds: u64,
    /// Moment the provider accepts attempts again
    pub available_at: DateTime<Utc>,
}

impl FloodWait {
    /// Wait of `seconds` reported by the provider at `observed_at`.
    #[must_use]
    pub fn observed(seconds: u64, observed_at: DateTime<Utc>) -> Self {
        let delta = i64::try_from(seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let available_at = observed_at
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            remaining_seconds: seconds,
            available_at,
        }
    }

    /// Wait left at `now` for a gate opening at `available_at`.
    ///
    /// Partial seconds round up; a gate already open yields zero.
    #[must_use]
    pub fn until(available_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let left = available_at - now;
        let remaining_seconds = if left <= TimeDelta::zero() {
            0
        } else {
            let whole = u64::try_from(left.num_seconds()).unwrap_or(0);
            whole + u64::from(left.subsec_nanos() > 0)
        };
        Self {
            remaining_seconds,
            available_at,
        }
    }

    /// Returns `true` once `now` has reached `available_at`.
    #[must_use]
    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        now >= self.available_at
    }

    /// Remaining time split for display.
    #[must_use]
    pub const fn breakdown(&self) -> WaitBreakdown {
        WaitBreakdown::from_seconds(self.remaining_seconds)
    }

    /// `available_at` in local time as `%Y-%m-%d %H:%M:%S`.
    #[must_use]
    pub fn available_at_local(&self) -> String {
        self.available_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// Hours, minutes and seconds of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitBreakdown {
    /// Whole hours
    pub hours: u64,
    /// Minutes past the hour
    pub minutes: u64,
    /// Seconds past the minute
    pub seconds: u64,
}

impl WaitBreakdown {
    /// Split `total` seconds.
    #[must_use]
    pub const fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for WaitBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
        } else if self.minutes > 0 {
            write!(f, "{}m {}s", self.minutes, self.seconds)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}
