//! Repository for the `absence_notes` table.

use fichaje_core::types::DbId;
use sqlx::PgPool;

use crate::models::absence_note::{AbsenceNote, CreateAbsenceNote, NOTE_STATUS_PENDING};

/// Column list for `absence_notes` queries.
const COLUMNS: &str = "id, shift_id, status, reason, created_at";

/// Provides persistence operations for absence excuses.
pub struct AbsenceNoteRepo;

impl AbsenceNoteRepo {
    /// Record a note for a shift. The `uq_absence_notes_shift` index rejects
    /// a second note for the same shift with a unique violation.
    pub async fn create(
        pool: &PgPool,
        shift_id: DbId,
        input: &CreateAbsenceNote,
    ) -> Result<AbsenceNote, sqlx::Error> {
        let query = format!(
            "INSERT INTO absence_notes (shift_id, status, reason) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AbsenceNote>(&query)
            .bind(shift_id)
            .bind(NOTE_STATUS_PENDING)
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    /// The note attached to a shift, if any.
    pub async fn find_by_shift(
        pool: &PgPool,
        shift_id: DbId,
    ) -> Result<Option<AbsenceNote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM absence_notes WHERE shift_id = $1");
        sqlx::query_as::<_, AbsenceNote>(&query)
            .bind(shift_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether any note exists for a shift (presence alone suppresses
    /// delay detection, regardless of status).
    pub async fn exists_for_shift(pool: &PgPool, shift_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM absence_notes WHERE shift_id = $1)")
                .bind(shift_id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }
}
