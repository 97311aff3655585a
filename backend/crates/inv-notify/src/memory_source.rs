//! In-process change source for tests.

use crate::{ChangeSource, ChangeSourceConnector, NotifyError, RawNotification, Result};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

#[derive(Default)]
struct MemoryState {
    sender: Option<mpsc::UnboundedSender<Result<RawNotification>>>,
    listening: HashSet<String>,
    unreachable: bool,
    connects: usize,
    closes: usize,
    listen_calls: Vec<String>,
}

/// Connector whose sources are fed through a [`MemoryHandle`].
#[derive(Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl ChangeSourceConnector for MemoryConnector {
    type Source = MemorySource;

    async fn connect(&self, _address: &str) -> Result<MemorySource> {
        let mut state = lock(&self.state);
        if state.unreachable {
            return Err(NotifyError::connection("memory source is unreachable"));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        state.sender = Some(sender);
        state.listening.clear();
        state.connects += 1;

        Ok(MemorySource {
            receiver,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MemorySource {
    receiver: mpsc::UnboundedReceiver<Result<RawNotification>>,
    state: Arc<Mutex<MemoryState>>,
}

#[async_trait]
impl ChangeSource for MemorySource {
    async fn listen(&mut self, channel: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.listening.insert(channel.to_string());
        state.listen_calls.push(channel.to_string());
        Ok(())
    }

    async fn recv(&mut self) -> Result<RawNotification> {
        match self.receiver.recv().await {
            Some(item) => item,
            None => Err(NotifyError::connection("memory source connection dropped")),
        }
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.sender = None;
        state.listening.clear();
        state.closes += 1;
        Ok(())
    }
}

/// Test-side controls and observations for a [`MemoryConnector`].
#[derive(Clone)]
pub struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHandle {
    /// Publish a payload. Returns false when nobody is listening on `channel`.
    pub fn notify(&self, channel: &str, payload: impl Into<Bytes>) -> bool {
        let state = lock(&self.state);
        if !state.listening.contains(channel) {
            return false;
        }

        match &state.sender {
            Some(sender) => sender
                .send(Ok(RawNotification::new(channel, payload)))
                .is_ok(),
            None => false,
        }
    }

    /// Sever the open connection; the next `recv` fails.
    pub fn drop_connection(&self) {
        let mut state = lock(&self.state);
        state.sender = None;
        state.listening.clear();
    }

    /// Make subsequent connects fail (or succeed again).
    pub fn set_unreachable(&self, unreachable: bool) {
        lock(&self.state).unreachable = unreachable;
    }

    pub fn is_open(&self) -> bool {
        lock(&self.state).sender.is_some()
    }

    pub fn connect_count(&self) -> usize {
        lock(&self.state).connects
    }

    pub fn close_count(&self) -> usize {
        lock(&self.state).closes
    }

    pub fn listen_calls(&self) -> Vec<String> {
        lock(&self.state).listen_calls.clone()
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
