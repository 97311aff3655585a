#![allow(dead_code)]

use inv_notify::ListenerState;
use inv_ws::{
    AppState, BroadcastConfig, BroadcastHub, ConnectionConfig, ConnectionLimits, Metrics,
    ShutdownCoordinator,
};

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::watch;
use tower::ServiceExt;

/// API tests need a live PostgreSQL; they are skipped when this is unset.
pub const TEST_DATABASE_URL_ENV: &str = "INV_TEST_DATABASE_URL";

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestApp {
    pub state: AppState,
    pub url: String,
    pub channel: String,
}

/// Connects and migrates, or returns None when no test database is configured.
pub async fn try_create_test_app() -> Option<TestApp> {
    let Ok(url) = std::env::var(TEST_DATABASE_URL_ENV) else {
        eprintln!("{TEST_DATABASE_URL_ENV} not set, skipping database test");
        return None;
    };

    // Each test notifies on its own channel so parallel tests don't see each other
    let channel = format!(
        "inv_api_test_{}_{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    );

    let pool = inv_db::connect_pool(&url, 2, &channel)
        .await
        .expect("Failed to connect to test database");
    inv_db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let metrics = Metrics::new();
    let (_, relay_state) = watch::channel(ListenerState::Listening);

    let state = AppState {
        pool,
        hub: BroadcastHub::new(
            ConnectionLimits { max_total: 16 },
            BroadcastConfig::default(),
            metrics.clone(),
        ),
        metrics,
        shutdown: ShutdownCoordinator::new(),
        config: ConnectionConfig::default(),
        relay_state,
    };

    Some(TestApp {
        state,
        url,
        channel,
    })
}

/// Name that won't collide with rows written by other tests.
pub fn unique_name(prefix: &str) -> String {
    format!(
        "{prefix}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// Send one request through a fresh router and decode the JSON body.
pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = inv_server::build_router(state.clone(), None)
        .oneshot(request)
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
