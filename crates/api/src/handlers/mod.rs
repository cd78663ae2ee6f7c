//! HTTP handlers.

pub mod absence;
pub mod clock;
pub mod shift;
