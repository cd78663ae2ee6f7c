use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fichaje_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses;
/// clocking errors additionally carry `current_state` / `attempted_action`
/// so a stale client can resynchronize.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fichaje_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            AppError::Core(core) => match core {
                CoreError::ShiftNotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "SHIFT_NOT_FOUND",
                    core.to_string(),
                    json!({}),
                ),
                CoreError::InvalidTransition { from, action } => (
                    StatusCode::CONFLICT,
                    "INVALID_TRANSITION",
                    core.to_string(),
                    json!({
                        "current_state": from,
                        "attempted_action": action,
                    }),
                ),
                CoreError::MandatoryBreakAlreadyTaken { .. } => (
                    StatusCode::CONFLICT,
                    "MANDATORY_BREAK_TAKEN",
                    core.to_string(),
                    json!({}),
                ),
                CoreError::LocationRequired(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "LOCATION_REQUIRED",
                    core.to_string(),
                    json!({}),
                ),
                CoreError::ConcurrentModification { current_state, .. } => (
                    StatusCode::CONFLICT,
                    "CONCURRENT_MODIFICATION",
                    core.to_string(),
                    json!({ "current_state": current_state, "retryable": true }),
                ),
                CoreError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    json!({}),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                        json!({}),
                    )
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                json!({}),
            ),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let (Some(obj), Some(extra)) = (body.as_object_mut(), detail.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, message and detail.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Pool acquisition timeouts map to 503 and are marked retryable.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(
    err: &sqlx::Error,
) -> (StatusCode, &'static str, String, serde_json::Value) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            json!({}),
        ),
        sqlx::Error::PoolTimedOut => (
            StatusCode::SERVICE_UNAVAILABLE,
            "DATABASE_BUSY",
            "Database connection timed out; retry shortly".to_string(),
            json!({ "retryable": true }),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                        json!({}),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                json!({}),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                json!({}),
            )
        }
    }
}
