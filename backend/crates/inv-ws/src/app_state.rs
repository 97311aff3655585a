use crate::{
    BroadcastHub, ClientConnection, ConnectionConfig, ConnectionId, Metrics, ShutdownCoordinator,
    WebSocketConnection,
};

use inv_notify::ListenerState;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::Response,
};
use log::{debug, warn};
use sqlx::PgPool;
use tokio::sync::{mpsc, watch};

/// Shared application state for HTTP and WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub hub: BroadcastHub,
    pub metrics: Metrics,
    pub shutdown: ShutdownCoordinator,
    pub config: ConnectionConfig,
    /// Lifecycle of the change listener feeding the hub
    pub relay_state: watch::Receiver<ListenerState>,
}

impl AppState {
    pub fn relay_state(&self) -> ListenerState {
        *self.relay_state.borrow()
    }
}

/// WebSocket upgrade handler
///
/// The client joins the hub before the upgrade completes, so the connection
/// limit is enforced with a plain 503. A failed upgrade unregisters it again.
pub async fn handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, StatusCode> {
    if state.shutdown.is_shutdown() {
        debug!("Refusing WebSocket upgrade during shutdown");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let (tx, rx) = mpsc::channel::<Message>(state.config.send_buffer_size);
    let control = tx.clone();

    // Register connection (enforces connection limits)
    let connection_id = state
        .hub
        .register(ClientConnection::new(tx))
        .await
        .map_err(|e| {
            warn!("Refusing WebSocket upgrade: {e}");
            state.metrics.connection_rejected();
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    debug!("Upgrading connection {connection_id}");

    let hub = state.hub.clone();
    let metrics = state.metrics.clone();

    Ok(ws
        .on_failed_upgrade(move |e| {
            warn!("WebSocket upgrade for connection {connection_id} failed: {e}");
            metrics.error_occurred("upgrade_failed");
            tokio::spawn(async move {
                hub.unregister(connection_id).await;
            });
        })
        .on_upgrade(move |socket| handle_socket(socket, connection_id, rx, control, state)))
}

/// Handle WebSocket connection after upgrade
async fn handle_socket(
    socket: WebSocket,
    connection_id: ConnectionId,
    outbound: mpsc::Receiver<Message>,
    control: mpsc::Sender<Message>,
    state: AppState,
) {
    let shutdown_guard = state.shutdown.subscribe_guard();

    let connection = WebSocketConnection::new(
        connection_id,
        state.config.clone(),
        state.metrics.clone(),
        state.hub.clone(),
    );

    if let Err(e) = connection
        .handle(socket, outbound, control, shutdown_guard)
        .await
    {
        warn!("Connection {connection_id} ended with error: {e}");
    }
}
