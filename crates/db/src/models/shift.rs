//! Shift entity model and DTOs.

use fichaje_core::error::CoreError;
use fichaje_core::shift::{ShiftState, StateId};
use fichaje_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `shifts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Shift {
    pub id: DbId,
    pub contract_id: DbId,
    pub planned_start: Option<Timestamp>,
    pub planned_end: Option<Timestamp>,
    pub state_id: StateId,
    pub version: i64,
    pub actual_start: Option<Timestamp>,
    pub actual_end: Option<Timestamp>,
    pub entry_latitude: Option<f64>,
    pub entry_longitude: Option<f64>,
    pub entry_ip: Option<String>,
    pub entry_user_agent: Option<String>,
    pub exit_latitude: Option<f64>,
    pub exit_longitude: Option<f64>,
    pub exit_ip: Option<String>,
    pub exit_user_agent: Option<String>,
    pub leave_request_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Shift {
    /// Resolve the lifecycle state, failing on an unknown `state_id`
    /// (schema drift, never expected at runtime).
    pub fn state(&self) -> Result<ShiftState, CoreError> {
        ShiftState::from_id(self.state_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "shift {} has unknown state_id {}",
                self.id, self.state_id
            ))
        })
    }
}

/// DTO for materializing a planned shift via `POST /api/v1/shifts`.
#[derive(Debug, Deserialize)]
pub struct CreateShift {
    pub contract_id: DbId,
    pub planned_start: Option<Timestamp>,
    pub planned_end: Option<Timestamp>,
    pub leave_request_id: Option<DbId>,
}
