//! Repository for the durable `events` log.

use fichaje_core::types::DbId;
use sqlx::PgPool;

/// Provides the insert path used by the event persistence sink.
pub struct EventRepo;

impl EventRepo {
    /// Insert one event row.
    ///
    /// When `dedup_key` is set and a row with the same key already exists,
    /// the insert is a no-op and `None` is returned. This is the idempotency
    /// safeguard for re-run delay sweeps.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        shift_id: Option<DbId>,
        actor_id: Option<DbId>,
        payload: &serde_json::Value,
        dedup_key: Option<&str>,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "INSERT INTO events (event_type, shift_id, actor_id, payload, dedup_key) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (dedup_key) WHERE dedup_key IS NOT NULL DO NOTHING \
             RETURNING id",
        )
        .bind(event_type)
        .bind(shift_id)
        .bind(actor_id)
        .bind(payload)
        .bind(dedup_key)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Count rows for an event type (test and diagnostics helper).
    pub async fn count_by_type(pool: &PgPool, event_type: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM events WHERE event_type = $1")
                .bind(event_type)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
