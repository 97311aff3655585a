use crate::{
    BroadcastConfig, BroadcastOutcome, ClientConnection, ConnectionId, ConnectionLimits, Metrics,
    Result as WsErrorResult, WsError,
};

use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::Message;
use error_location::ErrorLocation;
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use tokio::sync::mpsc::error::SendTimeoutError;

/// Live set of WebSocket clients and fan-out over it.
///
/// Registration, unregistration and the prune pass of `broadcast` all take the
/// write lock; sends run against a snapshot taken under the read lock, so a
/// client that joins mid-broadcast does not receive that message.
pub struct BroadcastHub {
    inner: Arc<RwLock<HubInner>>,
    limits: ConnectionLimits,
    config: BroadcastConfig,
    metrics: Metrics,
}

struct HubInner {
    connections: HashMap<ConnectionId, ClientConnection>,
}

impl BroadcastHub {
    pub fn new(limits: ConnectionLimits, config: BroadcastConfig, metrics: Metrics) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HubInner {
                connections: HashMap::new(),
            })),
            limits,
            config,
            metrics,
        }
    }

    /// Add a connection to the live set.
    ///
    /// When the set is full, entries whose queue receiver is gone are dropped
    /// first, so an abandoned upgrade never holds a slot.
    pub async fn register(&self, connection: ClientConnection) -> WsErrorResult<ConnectionId> {
        let mut inner = self.inner.write().await;

        if inner.connections.len() >= self.limits.max_total {
            let before = inner.connections.len();
            inner.connections.retain(|_, existing| !existing.is_closed());
            let reclaimed = before - inner.connections.len();
            if reclaimed > 0 {
                info!("Reclaimed {reclaimed} closed connection(s) at the limit");
                self.metrics.connections_pruned(reclaimed);
            }
        }

        if inner.connections.len() >= self.limits.max_total {
            warn!(
                "Total connection limit reached: {}/{}",
                inner.connections.len(),
                self.limits.max_total
            );
            return Err(WsError::ConnectionLimitExceeded {
                current: inner.connections.len(),
                max: self.limits.max_total,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let connection_id = connection.id;
        inner.connections.insert(connection_id, connection);
        info!(
            "Registered connection {connection_id} ({} total)",
            inner.connections.len()
        );

        Ok(connection_id)
    }

    /// Remove a connection. Returns false if it was not registered.
    pub async fn unregister(&self, connection_id: ConnectionId) -> bool {
        let mut inner = self.inner.write().await;

        if inner.connections.remove(&connection_id).is_some() {
            info!(
                "Unregistered connection {connection_id} ({} total remaining)",
                inner.connections.len()
            );
            true
        } else {
            false
        }
    }

    /// Serialize `event` once as a JSON text frame and queue it for every
    /// live connection.
    ///
    /// Connections whose send fails are removed after all sends finish. Never
    /// fails: a serialization error is logged and nothing is sent.
    pub async fn broadcast<T>(&self, event: &T) -> BroadcastOutcome
    where
        T: Serialize + ?Sized,
    {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                let e = WsError::from(e);
                error!("Dropping broadcast: {e}");
                self.metrics.error_occurred(e.kind());
                return BroadcastOutcome::default();
            }
        };

        self.broadcast_message(Message::Text(payload.into())).await
    }

    /// Queue an already-encoded message for every live connection.
    pub async fn broadcast_message(&self, message: Message) -> BroadcastOutcome {
        let started = Instant::now();

        let snapshot: Vec<(ConnectionId, mpsc::Sender<Message>)> = {
            let inner = self.inner.read().await;
            inner
                .connections
                .iter()
                .map(|(id, connection)| (*id, connection.sender().clone()))
                .collect()
        };

        if snapshot.is_empty() {
            debug!("Broadcast skipped, no live connections");
            return BroadcastOutcome::default();
        }

        let sends = snapshot.into_iter().map(|(connection_id, sender)| {
            let message = message.clone();
            async move {
                match self.send(&sender, message).await {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("Send to connection {connection_id} failed: {e}");
                        self.metrics.send_failed(e.kind());
                        Some(connection_id)
                    }
                }
            }
        });
        let results = join_all(sends).await;

        let attempted = results.len();
        let failed: Vec<ConnectionId> = results.into_iter().flatten().collect();

        let mut pruned = 0;
        if !failed.is_empty() {
            let mut inner = self.inner.write().await;
            for connection_id in &failed {
                if inner.connections.remove(connection_id).is_some() {
                    pruned += 1;
                }
            }
            info!(
                "Pruned {pruned} failed connection(s) ({} total remaining)",
                inner.connections.len()
            );
            self.metrics.connections_pruned(pruned);
        }

        let delivered = attempted - failed.len();
        self.metrics.broadcast_published(delivered);
        self.metrics.broadcast_latency(started.elapsed());
        debug!("Broadcast queued for {delivered}/{attempted} connection(s)");

        BroadcastOutcome { delivered, pruned }
    }

    async fn send(&self, sender: &mpsc::Sender<Message>, message: Message) -> WsErrorResult<()> {
        sender
            .send_timeout(message, self.config.send_timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => WsError::SendTimeout {
                    timeout_ms: self.config.send_timeout.as_millis() as u64,
                    location: ErrorLocation::from(Location::caller()),
                },
                SendTimeoutError::Closed(_) => WsError::connection_closed("client queue closed"),
            })
    }

    /// Get total connection count
    pub async fn total_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.connections.len()
    }

    pub async fn contains(&self, connection_id: ConnectionId) -> bool {
        let inner = self.inner.read().await;
        inner.connections.contains_key(&connection_id)
    }

    /// True when a new registration would be refused.
    pub async fn is_full(&self) -> bool {
        self.total_count().await >= self.limits.max_total
    }

    pub fn max_connections(&self) -> usize {
        self.limits.max_total
    }
}

impl Clone for BroadcastHub {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            limits: self.limits.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
        }
    }
}
