//! In-process event bus backed by a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use fichaje_core::breaks::BreakKind;
use fichaje_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const EVENT_SHIFT_STARTED: &str = "shift.started";
pub const EVENT_SHIFT_PAUSED: &str = "shift.paused";
pub const EVENT_SHIFT_RESUMED: &str = "shift.resumed";
pub const EVENT_SHIFT_FINISHED: &str = "shift.finished";
pub const EVENT_SHIFT_IN_PROGRESS: &str = "shift.in_progress";
pub const EVENT_DELAY_DETECTED: &str = "delay.detected";
pub const EVENT_ABSENCE_OVERRUN: &str = "absence.overrun";

// ---------------------------------------------------------------------------
// ClockEvent
// ---------------------------------------------------------------------------

/// A domain event raised by the clock engine or the delay sweeper.
///
/// Constructed via the per-event constructors below and enriched with
/// [`with_actor`](ClockEvent::with_actor) /
/// [`with_payload`](ClockEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockEvent {
    /// Dot-separated event name, e.g. `"shift.started"`.
    pub event_type: String,

    /// The shift the event concerns, when there is one.
    pub shift_id: Option<DbId>,

    /// Id of the employee/user that triggered the event.
    pub actor_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// Idempotency key; events carrying one are persisted at most once.
    pub dedup_key: Option<String>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ClockEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            shift_id: None,
            actor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            dedup_key: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the subject shift.
    pub fn for_shift(mut self, shift_id: DbId) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// Attach the acting employee.
    pub fn with_actor(mut self, actor_id: DbId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Set the idempotency key.
    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }

    // -- per-event constructors ---------------------------------------------

    pub fn shift_started(shift_id: DbId) -> Self {
        Self::new(EVENT_SHIFT_STARTED).for_shift(shift_id)
    }

    pub fn shift_paused(shift_id: DbId, kind: BreakKind) -> Self {
        Self::new(EVENT_SHIFT_PAUSED)
            .for_shift(shift_id)
            .with_payload(serde_json::json!({ "break_kind": kind.as_str() }))
    }

    pub fn shift_resumed(shift_id: DbId, kind: BreakKind, break_minutes: i64) -> Self {
        Self::new(EVENT_SHIFT_RESUMED)
            .for_shift(shift_id)
            .with_payload(serde_json::json!({
                "break_kind": kind.as_str(),
                "break_minutes": break_minutes,
            }))
    }

    pub fn shift_finished(shift_id: DbId, next_shift_id: Option<DbId>) -> Self {
        Self::new(EVENT_SHIFT_FINISHED)
            .for_shift(shift_id)
            .with_payload(serde_json::json!({ "next_shift_id": next_shift_id }))
    }

    pub fn shift_in_progress(shift_id: DbId, worked_minutes: i64) -> Self {
        Self::new(EVENT_SHIFT_IN_PROGRESS)
            .for_shift(shift_id)
            .with_payload(serde_json::json!({ "worked_minutes": worked_minutes }))
    }

    pub fn delay_detected(shift_id: DbId, minutes: i64) -> Self {
        Self::new(EVENT_DELAY_DETECTED)
            .for_shift(shift_id)
            .with_payload(serde_json::json!({ "minutes": minutes }))
            .with_dedup_key(fichaje_core::delay::delay_dedup_key(shift_id, minutes))
    }

    pub fn absence_overrun(shift_id: DbId, minutes: i64) -> Self {
        Self::new(EVENT_ABSENCE_OVERRUN)
            .for_shift(shift_id)
            .with_payload(serde_json::json!({ "minutes": minutes }))
            .with_dedup_key(fichaje_core::delay::overrun_dedup_key(shift_id, minutes))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ClockEvent`]. Shared via
/// `Arc<EventBus>` across the application.
pub struct EventBus {
    sender: broadcast::Sender<ClockEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped; the
    /// persistence sink (when subscribed) ensures durable capture.
    pub fn publish(&self, event: ClockEvent) {
        // The SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
