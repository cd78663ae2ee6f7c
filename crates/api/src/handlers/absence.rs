//! Narrow interface to the absence-excuse workflow.
//!
//! This service only records notes and checks their presence; the approval
//! lifecycle (pendiente/justificada/rechazada) lives in the external
//! permission-request module.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fichaje_core::types::DbId;
use fichaje_db::models::absence_note::CreateAbsenceNote;
use fichaje_db::repositories::AbsenceNoteRepo;

use crate::error::AppResult;
use crate::handlers::shift::ensure_shift_exists;
use crate::middleware::actor::ActorId;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/shifts/{shift_id}/absence-note
///
/// Record an excuse for a shift. Once present, the shift is excluded from
/// delay detection whatever the note's eventual status. A second note for
/// the same shift is rejected with 409.
pub async fn create_absence_note(
    actor: ActorId,
    State(state): State<AppState>,
    Path(shift_id): Path<DbId>,
    Json(input): Json<CreateAbsenceNote>,
) -> AppResult<impl IntoResponse> {
    ensure_shift_exists(&state, shift_id).await?;

    let note = AbsenceNoteRepo::create(&state.pool, shift_id, &input).await?;

    tracing::info!(
        shift_id,
        actor_id = actor.0,
        note_id = note.id,
        "Absence note recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// GET /api/v1/shifts/{shift_id}/absence-note
pub async fn get_absence_note(
    State(state): State<AppState>,
    Path(shift_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_shift_exists(&state, shift_id).await?;

    let note = AbsenceNoteRepo::find_by_shift(&state.pool, shift_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(Json(DataResponse { data: note }))
}
