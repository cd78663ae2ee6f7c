//! Absence excuse model and DTO.

use fichaje_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status a note starts in; the approval workflow that moves it onward is an
/// external collaborator. Delay detection ignores the status entirely.
pub const NOTE_STATUS_PENDING: &str = "pendiente";

/// A row from the `absence_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AbsenceNote {
    pub id: DbId,
    pub shift_id: DbId,
    pub status: String,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/shifts/{shift_id}/absence-note`.
#[derive(Debug, Deserialize)]
pub struct CreateAbsenceNote {
    pub reason: Option<String>,
}
