use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fichaje_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus the clock engine publishes to after commit.
    pub event_bus: Arc<fichaje_events::EventBus>,
}
