//! Batch delay detection over committed shifts.
//!
//! The sweeper is a pure detector: it reads shifts and absence notes, never
//! writes shift state, and emits `delay.detected` / `absence.overrun`
//! events. Duplicate suppression across overlapping runs happens in the
//! event sink via each event's idempotency key, so re-running any range is
//! safe.

pub mod config;
pub mod sweep;

pub use config::SweepConfig;
pub use sweep::{run_sweep, SweepRange, SweepSummary};
