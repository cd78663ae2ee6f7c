//! Shift and clocking routes.
//!
//! ```text
//! POST   /                               create_shift
//! GET    /{shift_id}                     get_shift
//! POST   /{shift_id}/clock               clock_shift
//! GET    /{shift_id}/breaks              list_breaks
//! POST   /{shift_id}/absence-note        create_absence_note
//! GET    /{shift_id}/absence-note        get_absence_note
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{absence, clock, shift};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(shift::create_shift))
        .route("/{shift_id}", get(shift::get_shift))
        .route("/{shift_id}/clock", post(clock::clock_shift))
        .route("/{shift_id}/breaks", get(shift::list_breaks))
        .route(
            "/{shift_id}/absence-note",
            post(absence::create_absence_note).get(absence::get_absence_note),
        )
}
