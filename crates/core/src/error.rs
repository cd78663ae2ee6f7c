use chrono::NaiveDate;

use crate::shift::{ClockAction, ShiftState};
use crate::types::DbId;

/// Domain error taxonomy for the clocking core.
///
/// Validation errors (`InvalidTransition`, `MandatoryBreakAlreadyTaken`,
/// `LocationRequired`, `Validation`) are caller-correctable and never
/// retried. `ConcurrentModification` is transient: the caller lost the
/// version race and may retry against the new state.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Shift not found: {id}")]
    ShiftNotFound { id: DbId },

    #[error("Invalid transition: action '{action}' is not allowed from state '{from}'")]
    InvalidTransition { from: ShiftState, action: ClockAction },

    #[error("Mandatory break already taken for shift {shift_id} on {date}")]
    MandatoryBreakAlreadyTaken { shift_id: DbId, date: NaiveDate },

    #[error("Location required: {0}")]
    LocationRequired(String),

    #[error("Concurrent modification of shift {shift_id}; current state is '{current_state}'")]
    ConcurrentModification {
        shift_id: DbId,
        current_state: ShiftState,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
