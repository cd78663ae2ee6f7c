//! Shift read/materialization handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fichaje_core::breaks;
use fichaje_core::error::CoreError;
use fichaje_core::types::DbId;
use fichaje_db::models::break_entry::BreakEntry;
use fichaje_db::models::shift::CreateShift;
use fichaje_db::repositories::{BreakRepo, ShiftRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/shifts
///
/// Materialize a planned shift (the scheduling module and tests use this;
/// real schedules are produced by the out-of-scope contract module).
pub async fn create_shift(
    State(state): State<AppState>,
    Json(input): Json<CreateShift>,
) -> AppResult<impl IntoResponse> {
    let shift = ShiftRepo::create(&state.pool, &input).await?;

    tracing::info!(shift_id = shift.id, contract_id = shift.contract_id, "Shift materialized");

    Ok((StatusCode::CREATED, Json(DataResponse { data: shift })))
}

/// GET /api/v1/shifts/{shift_id}
pub async fn get_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let shift = ShiftRepo::find_by_id(&state.pool, shift_id)
        .await?
        .ok_or(CoreError::ShiftNotFound { id: shift_id })?;

    Ok(Json(DataResponse { data: shift }))
}

/// One ledger entry plus its derived duration.
#[derive(Debug, Serialize)]
pub struct BreakWithDuration {
    #[serde(flatten)]
    pub entry: BreakEntry,
    /// Whole minutes; 0 while the break is still open.
    pub duration_minutes: i64,
}

/// GET /api/v1/shifts/{shift_id}/breaks
pub async fn list_breaks(
    State(state): State<AppState>,
    Path(shift_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_shift_exists(&state, shift_id).await?;

    let entries = BreakRepo::list_for_shift(&state.pool, shift_id).await?;
    let mut data = Vec::with_capacity(entries.len());
    for entry in entries {
        let duration_minutes = breaks::duration_minutes(&entry.interval()?);
        data.push(BreakWithDuration {
            entry,
            duration_minutes,
        });
    }

    Ok(Json(DataResponse { data }))
}

/// Shared existence check for shift-scoped routes.
pub async fn ensure_shift_exists(state: &AppState, shift_id: DbId) -> AppResult<()> {
    ShiftRepo::find_by_id(&state.pool, shift_id)
        .await?
        .ok_or(CoreError::ShiftNotFound { id: shift_id })?;
    Ok(())
}
