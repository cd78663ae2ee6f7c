//! The clock engine: atomic shift state transitions.

pub mod clock;

pub use clock::{ClockEngine, ClockOutcome};
