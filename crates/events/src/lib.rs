//! Event bus and notification plumbing for the clocking backend.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Publishing is fire-and-forget: a committed
//!   clock transition can never be unwound by a delivery problem.
//! - [`ClockEvent`]: the canonical domain event envelope.
//! - [`EventPersistence`]: background sink that durably writes every event
//!   to the `events` table, dropping duplicates by idempotency key.

pub mod bus;
pub mod persistence;

pub use bus::{ClockEvent, EventBus};
pub use persistence::EventPersistence;
