//! Handler for the clocking state machine.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use fichaje_core::geo::GeoStamp;
use fichaje_core::shift::{ClockAction, ShiftState};
use fichaje_core::types::DbId;
use fichaje_db::models::shift::Shift;
use serde::{Deserialize, Serialize};

use crate::engine::ClockEngine;
use crate::error::AppResult;
use crate::middleware::actor::ActorId;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /api/v1/shifts/{shift_id}/clock`.
#[derive(Debug, Deserialize)]
pub struct ClockRequest {
    pub action: ClockAction,
    /// When finishing one shift selects the next one (end-of-shift flow).
    pub next_shift_id: Option<DbId>,
    pub geo: GeoStamp,
}

/// Success payload: the new state plus the updated shift row.
#[derive(Debug, Serialize)]
pub struct ClockResponse {
    pub new_state: ShiftState,
    pub shift: Shift,
}

/// POST /api/v1/shifts/{shift_id}/clock
///
/// Apply one clocking action. The transition commits before the event is
/// published; the publish itself cannot fail the request.
pub async fn clock_shift(
    actor: ActorId,
    State(state): State<AppState>,
    Path(shift_id): Path<DbId>,
    Json(input): Json<ClockRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = ClockEngine::apply(
        &state.pool,
        shift_id,
        input.action,
        actor.0,
        &input.geo,
        input.next_shift_id,
        Utc::now(),
    )
    .await?;

    state.event_bus.publish(outcome.event);

    Ok(Json(DataResponse {
        data: ClockResponse {
            new_state: outcome.new_state,
            shift: outcome.shift,
        },
    }))
}
