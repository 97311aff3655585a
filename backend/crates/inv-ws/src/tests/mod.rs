
use crate::{BroadcastConfig, BroadcastHub, ClientConnection, ConnectionLimits, Metrics};

use std::time::Duration;

use axum::extract::ws::Message;
use tokio::sync::mpsc;

pub(crate) fn hub(max_total: usize, send_timeout: Duration) -> BroadcastHub {
    BroadcastHub::new(
        ConnectionLimits { max_total },
        BroadcastConfig { send_timeout },
        Metrics::new(),
    )
}

pub(crate) fn client(capacity: usize) -> (ClientConnection, mpsc::Receiver<Message>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ClientConnection::new(tx), rx)
}

pub(crate) fn text(message: Option<Message>) -> String {
    match message {
        Some(Message::Text(text)) => text.as_str().to_string(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}
