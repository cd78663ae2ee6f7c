use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use fichaje_api::config::ServerConfig;
use fichaje_api::routes;
use fichaje_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shift_tick_secs: 300,
    }
}

/// Build the application router with the production middleware layers,
/// mirroring the construction in `main.rs`, without spawning the
/// background services.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus: Arc::new(fichaje_events::EventBus::default()),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

/// A well-formed audit stamp for request bodies.
pub fn geo_json() -> serde_json::Value {
    serde_json::json!({
        "latitude": 40.4168,
        "longitude": -3.7038,
        "ip": "203.0.113.9",
        "user_agent": "Mozilla/5.0"
    })
}

/// Send a JSON request carrying the `x-actor-id` header and return
/// `(status, parsed body)`.
pub async fn request_json(
    app: &Router,
    method: Method,
    uri: &str,
    actor_id: Option<i64>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(actor) = actor_id {
        builder = builder.header("x-actor-id", actor.to_string());
    }

    let request = builder
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Create a planned shift over the API and return its id.
pub async fn create_shift(app: &Router, planned_start: Option<&str>) -> i64 {
    let (status, body) = request_json(
        app,
        Method::POST,
        "/api/v1/shifts",
        Some(7),
        Some(serde_json::json!({
            "contract_id": 42,
            "planned_start": planned_start,
            "planned_end": null,
            "leave_request_id": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create shift failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

/// Apply a clock action over the API.
pub async fn clock(
    app: &Router,
    shift_id: i64,
    action: &str,
) -> (StatusCode, serde_json::Value) {
    request_json(
        app,
        Method::POST,
        &format!("/api/v1/shifts/{shift_id}/clock"),
        Some(7),
        Some(serde_json::json!({
            "action": action,
            "next_shift_id": null,
            "geo": geo_json()
        })),
    )
    .await
}
