//! Repository for the `shifts` table.
//!
//! All state transitions are compare-and-swap updates guarded by the row's
//! `version` column plus the expected `state_id`. Zero rows affected means
//! the caller lost a race (or the state moved underneath it) and must
//! re-read and classify; the engine does exactly that.

use fichaje_core::geo::GeoStamp;
use fichaje_core::shift::ShiftState;
use fichaje_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::shift::{CreateShift, Shift};

/// Column list for `shifts` queries.
const COLUMNS: &str = "\
    id, contract_id, planned_start, planned_end, state_id, version, \
    actual_start, actual_end, \
    entry_latitude, entry_longitude, entry_ip, entry_user_agent, \
    exit_latitude, exit_longitude, exit_ip, exit_user_agent, \
    leave_request_id, created_at, updated_at";

/// Provides persistence operations for shifts.
pub struct ShiftRepo;

impl ShiftRepo {
    /// Materialize a planned shift (schedule materialization and tests).
    pub async fn create(pool: &PgPool, input: &CreateShift) -> Result<Shift, sqlx::Error> {
        let query = format!(
            "INSERT INTO shifts (contract_id, planned_start, planned_end, leave_request_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(input.contract_id)
            .bind(input.planned_start)
            .bind(input.planned_end)
            .bind(input.leave_request_id)
            .fetch_one(pool)
            .await
    }

    /// Find a shift by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Shift>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shifts WHERE id = $1");
        sqlx::query_as::<_, Shift>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Clock in: record the entry timestamp and audit stamp.
    ///
    /// Returns `None` when the version/state guard did not match.
    pub async fn start(
        exec: impl sqlx::PgExecutor<'_>,
        id: DbId,
        version: i64,
        now: Timestamp,
        geo: &GeoStamp,
    ) -> Result<Option<Shift>, sqlx::Error> {
        let query = format!(
            "UPDATE shifts \
             SET state_id = $4, actual_start = $5, \
                 entry_latitude = $6, entry_longitude = $7, \
                 entry_ip = $8, entry_user_agent = $9, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2 AND state_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(id)
            .bind(version)
            .bind(ShiftState::SinIniciar.id())
            .bind(ShiftState::EnCurso.id())
            .bind(now)
            .bind(geo.latitude)
            .bind(geo.longitude)
            .bind(&geo.ip)
            .bind(&geo.user_agent)
            .fetch_optional(exec)
            .await
    }

    /// Move between states without touching entry/exit columns (break
    /// transitions). Same guard semantics as [`ShiftRepo::start`].
    pub async fn set_state(
        exec: impl sqlx::PgExecutor<'_>,
        id: DbId,
        version: i64,
        from: ShiftState,
        to: ShiftState,
    ) -> Result<Option<Shift>, sqlx::Error> {
        let query = format!(
            "UPDATE shifts \
             SET state_id = $4, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2 AND state_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(id)
            .bind(version)
            .bind(from.id())
            .bind(to.id())
            .fetch_optional(exec)
            .await
    }

    /// Clock out: record the exit timestamp and audit stamp.
    pub async fn finish(
        exec: impl sqlx::PgExecutor<'_>,
        id: DbId,
        version: i64,
        now: Timestamp,
        geo: &GeoStamp,
    ) -> Result<Option<Shift>, sqlx::Error> {
        let query = format!(
            "UPDATE shifts \
             SET state_id = $4, actual_end = $5, \
                 exit_latitude = $6, exit_longitude = $7, \
                 exit_ip = $8, exit_user_agent = $9, \
                 version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND version = $2 AND state_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(id)
            .bind(version)
            .bind(ShiftState::EnCurso.id())
            .bind(ShiftState::Finalizado.id())
            .bind(now)
            .bind(geo.latitude)
            .bind(geo.longitude)
            .bind(&geo.ip)
            .bind(&geo.user_agent)
            .fetch_optional(exec)
            .await
    }

    /// One page of the delay scan: shifts with a recorded entry, no absence
    /// note, and a planned start inside `[range_start, range_end)`, ordered
    /// by planned start.
    ///
    /// Shifts without a planned start are windowed by their creation date so
    /// they surface once (as a logged per-item failure) in that day's sweep
    /// instead of never or always.
    pub async fn list_for_delay_scan(
        pool: &PgPool,
        range_start: Timestamp,
        range_end: Timestamp,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Shift>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shifts \
             WHERE actual_start IS NOT NULL \
               AND ( \
                   (planned_start >= $1 AND planned_start < $2) \
                   OR (planned_start IS NULL AND created_at >= $1 AND created_at < $2) \
               ) \
               AND NOT EXISTS ( \
                   SELECT 1 FROM absence_notes an WHERE an.shift_id = shifts.id \
               ) \
             ORDER BY planned_start ASC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(range_start)
            .bind(range_end)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Shifts currently clocked in, for the in-progress ticker.
    pub async fn list_in_progress(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Shift>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shifts \
             WHERE state_id = $1 \
             ORDER BY actual_start ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(ShiftState::EnCurso.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
