//! Acting-employee extractor for Axum handlers.
//!
//! Authentication is terminated upstream of this service; the gateway
//! forwards the authenticated employee id in the `x-actor-id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fichaje_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// The employee performing the request, from the `x-actor-id` header.
///
/// Use this as an extractor parameter in any handler that records who acted:
///
/// ```ignore
/// async fn my_handler(actor: ActorId) -> AppResult<Json<()>> {
///     tracing::info!(actor_id = actor.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub DbId);

impl FromRequestParts<AppState> for ActorId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing x-actor-id header".into()))?;

        let id: DbId = raw
            .parse()
            .map_err(|_| AppError::BadRequest("x-actor-id must be an integer id".into()))?;

        Ok(ActorId(id))
    }
}
