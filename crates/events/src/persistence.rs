//! Durable event persistence sink.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`ClockEvent`] to the
//! `events` table. It runs as a long-lived background task and shuts down
//! when the bus sender is dropped. Persistence failures are logged and never
//! propagate back to the publisher.

use fichaje_db::repositories::EventRepo;
use fichaje_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ClockEvent;

/// Background service that persists clock events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ClockEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => match Self::persist(&pool, &event).await {
                    Ok(Some(id)) => {
                        tracing::debug!(
                            event_id = id,
                            event_type = %event.event_type,
                            "Event persisted"
                        );
                    }
                    Ok(None) => {
                        // Idempotency-key conflict: a previous sweep already
                        // recorded this exact notification.
                        tracing::debug!(
                            event_type = %event.event_type,
                            dedup_key = ?event.dedup_key,
                            "Duplicate event suppressed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event row; `None` means a dedup-key conflict.
    async fn persist(
        pool: &DbPool,
        event: &ClockEvent,
    ) -> Result<Option<i64>, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.event_type,
            event.shift_id,
            event.actor_id,
            &event.payload,
            event.dedup_key.as_deref(),
        )
        .await
    }
}
