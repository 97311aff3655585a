use crate::{
    BroadcastHub, ConnectionConfig, ConnectionId, Metrics, Result as WsErrorResult, ShutdownGuard,
    WsError,
};

use std::panic::Location;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use bytes::Bytes;
use error_location::ErrorLocation;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Manages a single WebSocket connection after it has joined the hub.
///
/// Outbound traffic (broadcasts, pongs, heartbeat pings, the final close
/// frame) all goes through the one bounded queue created at accept time, and
/// a dedicated writer task drains it in order.
pub struct WebSocketConnection {
    connection_id: ConnectionId,
    config: ConnectionConfig,
    metrics: Metrics,
    hub: BroadcastHub,
}

impl WebSocketConnection {
    pub fn new(
        connection_id: ConnectionId,
        config: ConnectionConfig,
        metrics: Metrics,
        hub: BroadcastHub,
    ) -> Self {
        Self {
            connection_id,
            config,
            metrics,
            hub,
        }
    }

    /// Drive the connection until the client leaves, the hub drops it, the
    /// heartbeat times out or the server shuts down. Always unregisters.
    ///
    /// `outbound` must be the queue whose sender was registered with the hub
    /// under `connection_id`; `control` is a second sender on the same queue.
    pub async fn handle(
        self,
        socket: WebSocket,
        outbound: mpsc::Receiver<Message>,
        control: mpsc::Sender<Message>,
        mut shutdown_guard: ShutdownGuard,
    ) -> WsErrorResult<()> {
        info!("WebSocket connection {} established", self.connection_id);
        self.metrics.connection_established();

        let (ws_sender, mut ws_receiver) = socket.split();
        let send_task = tokio::spawn(write_outbound(self.connection_id, ws_sender, outbound));

        let heartbeat_interval = self.config.heartbeat_interval();
        let heartbeat_timeout = self.config.heartbeat_timeout();
        let mut heartbeat = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_heard = Instant::now();

        let result = loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            last_heard = Instant::now();
                            if let Some(result) = self.handle_client_message(msg, &control) {
                                break result;
                            }
                        }
                        Some(Err(e)) => {
                            error!(
                                "WebSocket error on connection {}: {}",
                                self.connection_id, e
                            );
                            break Err(WsError::connection_closed(format!("WebSocket error: {e}")));
                        }
                        None => {
                            info!("Connection {} closed by client", self.connection_id);
                            break Ok(());
                        }
                    }
                }

                _ = heartbeat.tick() => {
                    if last_heard.elapsed() >= heartbeat_timeout {
                        warn!(
                            "Connection {} missed heartbeat for {}s",
                            self.connection_id, self.config.heartbeat_timeout_secs
                        );
                        break Err(WsError::HeartbeatTimeout {
                            timeout_secs: self.config.heartbeat_timeout_secs,
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }

                    if !self.hub.contains(self.connection_id).await {
                        info!("Connection {} was dropped by the hub", self.connection_id);
                        break Err(WsError::connection_closed("removed from live set after failed send"));
                    }

                    if control.try_send(Message::Ping(Bytes::new())).is_err() {
                        debug!("Heartbeat ping skipped for connection {}, queue full", self.connection_id);
                    }
                }

                _ = shutdown_guard.wait() => {
                    info!("Shutting down connection {} gracefully", self.connection_id);
                    let frame = CloseFrame {
                        code: close_code::AWAY,
                        reason: Utf8Bytes::from_static("server shutting down"),
                    };
                    if control.try_send(Message::Close(Some(frame))).is_err() {
                        debug!("Close frame not queued for connection {}", self.connection_id);
                    }
                    break Ok(());
                }
            }
        };

        // Cleanup: the hub's sender and ours are the only ones, so the writer
        // drains what is queued and stops.
        self.hub.unregister(self.connection_id).await;
        drop(control);
        let _ = send_task.await;

        match &result {
            Ok(()) => self.metrics.connection_closed("normal"),
            Err(e) => {
                self.metrics.error_occurred(e.kind());
                self.metrics.connection_closed(e.kind());
            }
        }

        info!("WebSocket connection {} closed", self.connection_id);

        result
    }

    /// Returns `Some` when the message ends the connection.
    fn handle_client_message(
        &self,
        msg: Message,
        control: &mpsc::Sender<Message>,
    ) -> Option<WsErrorResult<()>> {
        match msg {
            Message::Ping(data) => {
                if control.try_send(Message::Pong(data)).is_err() {
                    debug!("Pong skipped for connection {}, queue full", self.connection_id);
                }
                None
            }
            Message::Pong(_) => None,
            Message::Text(text) => {
                debug!(
                    "Ignoring text message ({} bytes) from connection {}",
                    text.as_str().len(),
                    self.connection_id
                );
                None
            }
            Message::Binary(data) => {
                debug!(
                    "Ignoring binary message ({} bytes) from connection {}",
                    data.len(),
                    self.connection_id
                );
                None
            }
            Message::Close(_) => {
                info!("Received close frame from connection {}", self.connection_id);
                Some(Ok(()))
            }
        }
    }
}

async fn write_outbound(
    connection_id: ConnectionId,
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Message>,
) {
    while let Some(msg) = outbound.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(e) = ws_sender.send(msg).await {
            debug!("Writer for connection {connection_id} stopped: {e}");
            break;
        }
        if closing {
            break;
        }
    }
    let _ = ws_sender.close().await;
}
