//! Domain logic for the attendance clocking backend.
//!
//! Everything in this crate is pure: the shift state machine, the break
//! ledger policy, delay classification, and the geolocation payload checks.
//! No I/O and no clock access; callers pass timestamps in explicitly.

pub mod breaks;
pub mod delay;
pub mod error;
pub mod geo;
pub mod shift;
pub mod types;

pub use error::CoreError;
