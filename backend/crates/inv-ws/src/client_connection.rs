use crate::ConnectionId;

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// One live push destination.
///
/// The sender feeds the connection's outbound queue, so everything sent to one
/// client leaves in FIFO order. Not `Clone`: a handle is owned by exactly one
/// hub once registered.
#[derive(Debug)]
pub struct ClientConnection {
    pub id: ConnectionId,
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<Message>,
}

impl ClientConnection {
    pub fn new(sender: mpsc::Sender<Message>) -> Self {
        Self {
            id: ConnectionId::new(),
            connected_at: Utc::now(),
            sender,
        }
    }

    pub fn sender(&self) -> &mpsc::Sender<Message> {
        &self.sender
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
