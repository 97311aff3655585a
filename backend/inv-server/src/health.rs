use inv_notify::ListenerState;
use inv_ws::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::warn;
use serde_json::json;

/// GET /health - Component status
///
/// Reports `degraded` while the relay is not listening; CRUD keeps working
/// then, but live updates are paused.
pub async fn health(State(state): State<AppState>) -> Response {
    let relay = state.relay_state();
    let connections = state.hub.total_count().await;

    let status = if relay == ListenerState::Listening {
        "healthy"
    } else {
        "degraded"
    };

    let health = json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "relay": relay,
            "websocket": {
                "connections": connections,
                "max_connections": state.hub.max_connections(),
            },
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Liveness check (is the process alive?)
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Readiness check (can we reach the database?)
pub async fn readiness(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, "Ready").into_response(),
        Err(e) => {
            warn!("Readiness check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable").into_response()
        }
    }
}
