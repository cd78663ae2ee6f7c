//! Delay computation and threshold classification for the sweeper.
//!
//! All functions take timestamps explicitly so sweep runs are deterministic
//! and testable; there is no hidden "now" anywhere in this module.

use crate::types::{DbId, Timestamp};

/// Delay thresholds in whole minutes. A delay must strictly exceed a
/// threshold to cross it.
#[derive(Debug, Clone, Copy)]
pub struct DelayThresholds {
    /// Crossing this raises a delay notification.
    pub minor_minutes: i64,
    /// Crossing this additionally raises an absence-overrun notification.
    pub major_minutes: i64,
}

impl Default for DelayThresholds {
    fn default() -> Self {
        Self {
            minor_minutes: 15,
            major_minutes: 60,
        }
    }
}

/// Severity bucket for a computed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySeverity {
    /// On time, or late within the minor threshold.
    None,
    /// Late beyond the minor threshold.
    Delay,
    /// Late beyond the major threshold; counts as an absence overrun too.
    Overrun,
}

/// Whole minutes of lateness: actual entry minus planned start.
/// Negative when the employee clocked in early.
pub fn delay_minutes(planned_start: Timestamp, actual_start: Timestamp) -> i64 {
    (actual_start - planned_start).num_minutes()
}

/// Classify a delay against the thresholds.
pub fn classify(minutes: i64, thresholds: &DelayThresholds) -> DelaySeverity {
    if minutes > thresholds.major_minutes {
        DelaySeverity::Overrun
    } else if minutes > thresholds.minor_minutes {
        DelaySeverity::Delay
    } else {
        DelaySeverity::None
    }
}

/// Idempotency key for a delay notification.
///
/// Deterministic over (shift, computed minutes), so re-sweeping an unchanged
/// shift produces the same key and the event sink drops the duplicate; a
/// changed entry time yields a new key and a fresh notification.
pub fn delay_dedup_key(shift_id: DbId, minutes: i64) -> String {
    format!("delay:{shift_id}:{minutes}")
}

/// Idempotency key for an absence-overrun notification.
pub fn overrun_dedup_key(shift_id: DbId, minutes: i64) -> String {
    format!("overrun:{shift_id}:{minutes}")
}
