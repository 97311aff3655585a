use crate::{create_item, delete_item, get_item, health, list_items, update_item};

use inv_ws::AppState;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Build the application router with all endpoints
///
/// `static_dir`, when set, is served under `/static`.
pub fn build_router(state: AppState, static_dir: Option<&str>) -> Router {
    let router = Router::new()
        // WebSocket endpoint
        .route("/ws", get(inv_ws::handler))
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        // Inventory REST API
        .route("/api/v1/items", get(list_items).post(create_item))
        .route(
            "/api/v1/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        );

    let router = match static_dir {
        Some(dir) => router.nest_service("/static", ServeDir::new(dir)),
        None => router,
    };

    router
        // Add shared state
        .with_state(state)
        // CORS middleware (allow all origins for WebSocket)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
