//! Repository for the `shift_breaks` ledger.
//!
//! Rows are only ever written by the clock engine while it holds the
//! shift's version guard, inside the same transaction as the state change.
//! The `uq_shift_breaks_open` partial unique index backs the single-open-
//! break invariant at the storage level.

use fichaje_core::breaks::BreakKind;
use fichaje_core::geo::GeoStamp;
use fichaje_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::break_entry::BreakEntry;

/// Column list for `shift_breaks` queries.
const COLUMNS: &str = "\
    id, shift_id, kind, started_at, ended_at, \
    start_latitude, start_longitude, start_ip, start_user_agent, \
    end_latitude, end_longitude, end_ip, end_user_agent, created_at";

/// Provides persistence operations for break ledger entries.
pub struct BreakRepo;

impl BreakRepo {
    /// Open a new break interval.
    pub async fn open(
        exec: impl sqlx::PgExecutor<'_>,
        shift_id: DbId,
        kind: BreakKind,
        now: Timestamp,
        geo: &GeoStamp,
    ) -> Result<BreakEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO shift_breaks \
                 (shift_id, kind, started_at, \
                  start_latitude, start_longitude, start_ip, start_user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BreakEntry>(&query)
            .bind(shift_id)
            .bind(kind.as_str())
            .bind(now)
            .bind(geo.latitude)
            .bind(geo.longitude)
            .bind(&geo.ip)
            .bind(&geo.user_agent)
            .fetch_one(exec)
            .await
    }

    /// Close an open break interval, recording the end audit stamp.
    ///
    /// Returns `None` if the row is already closed (or gone).
    pub async fn close(
        exec: impl sqlx::PgExecutor<'_>,
        break_id: DbId,
        now: Timestamp,
        geo: &GeoStamp,
    ) -> Result<Option<BreakEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE shift_breaks \
             SET ended_at = $2, \
                 end_latitude = $3, end_longitude = $4, \
                 end_ip = $5, end_user_agent = $6 \
             WHERE id = $1 AND ended_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BreakEntry>(&query)
            .bind(break_id)
            .bind(now)
            .bind(geo.latitude)
            .bind(geo.longitude)
            .bind(&geo.ip)
            .bind(&geo.user_agent)
            .fetch_optional(exec)
            .await
    }

    /// The single open entry for a shift, if any.
    pub async fn find_open(
        pool: &PgPool,
        shift_id: DbId,
    ) -> Result<Option<BreakEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shift_breaks \
             WHERE shift_id = $1 AND ended_at IS NULL"
        );
        sqlx::query_as::<_, BreakEntry>(&query)
            .bind(shift_id)
            .fetch_optional(pool)
            .await
    }

    /// Full ledger for a shift, oldest first.
    pub async fn list_for_shift(
        pool: &PgPool,
        shift_id: DbId,
    ) -> Result<Vec<BreakEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shift_breaks \
             WHERE shift_id = $1 \
             ORDER BY started_at ASC"
        );
        sqlx::query_as::<_, BreakEntry>(&query)
            .bind(shift_id)
            .fetch_all(pool)
            .await
    }
}
