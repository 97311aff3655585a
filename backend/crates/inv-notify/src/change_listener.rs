use crate::{
    ChangeEvent, ChangeSource, ChangeSourceConnector, ListenerState, NotifyError, RawNotification,
    Result,
};

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use error_location::ErrorLocation;
use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use tokio::sync::{Mutex, RwLock, watch};

/// Callback invoked with every decoded event.
pub type ChangeCallback = Arc<dyn Fn(ChangeEvent) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Handle for a registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why [`ChangeListener::run_loop`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The cancellation signal fired.
    Cancelled,
    /// The source connection failed mid-loop.
    ConnectionLost,
}

struct Registration {
    id: ListenerId,
    callback: ChangeCallback,
}

/// Listens to one change source and fans each event out to callbacks.
///
/// All methods take `&self`; share it behind an `Arc`. The source connection
/// is held exclusively by the listener and is locked for the whole of
/// `run_loop`. `connect` on an open listener and `subscribe` on a channel
/// already subscribed return at once; anything that needs the source waits
/// until the loop has exited and closed it.
pub struct ChangeListener<C: ChangeSourceConnector> {
    address: String,
    connector: C,
    source: Mutex<Option<C::Source>>,
    /// Channels the open source listens on. Only changed with `source` locked.
    channels: RwLock<HashSet<String>>,
    callbacks: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
    state: watch::Sender<ListenerState>,
}

impl<C: ChangeSourceConnector> ChangeListener<C> {
    pub fn new(connector: C, address: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ListenerState::Disconnected);

        Self {
            address: address.into(),
            connector,
            source: Mutex::new(None),
            channels: RwLock::new(HashSet::new()),
            callbacks: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            state,
        }
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Observe state transitions without touching the connection.
    pub fn watch_state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    /// Open the source connection. No-op when already connected.
    pub async fn connect(&self) -> Result<()> {
        if self.state() != ListenerState::Disconnected {
            return Ok(());
        }

        let mut source = self.source.lock().await;
        self.connect_locked(&mut source).await
    }

    /// Register a callback for every future event. Callbacks run in
    /// registration order; the same closure may be registered twice.
    pub async fn add_listener<F, Fut>(&self, callback: F) -> ListenerId
    where
        F: Fn(ChangeEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: ChangeCallback = Arc::new(move |event| Box::pin(callback(event)));

        let mut callbacks = self.callbacks.write().await;
        callbacks.push(Registration { id, callback });
        debug!("Registered change listener {id} ({} total)", callbacks.len());

        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub async fn remove_listener(&self, id: ListenerId) -> bool {
        let mut callbacks = self.callbacks.write().await;
        let before = callbacks.len();
        callbacks.retain(|registration| registration.id != id);
        before != callbacks.len()
    }

    pub async fn listener_count(&self) -> usize {
        self.callbacks.read().await.len()
    }

    /// Start receiving events for `channel`, connecting first if needed.
    /// Subscribing to a channel twice keeps a single subscription.
    pub async fn subscribe(&self, channel: &str) -> Result<()> {
        if self.is_subscribed(channel).await {
            debug!("Already listening to channel: {channel}");
            return Ok(());
        }

        let mut source = self.source.lock().await;
        self.connect_locked(&mut source).await?;

        // Another subscribe may have won the lock first
        if self.is_subscribed(channel).await {
            debug!("Already listening to channel: {channel}");
            return Ok(());
        }

        let Some(open) = source.as_mut() else {
            return Err(NotifyError::connection("no open change source connection"));
        };

        if let Err(e) = open.listen(channel).await {
            error!("Failed to subscribe to channel {channel}: {e}");
            return Err(e);
        }

        self.channels.write().await.insert(channel.to_string());
        if self.state() == ListenerState::Connected {
            self.set_state(ListenerState::Subscribed);
        }
        info!("Listening to channel: {channel}");

        Ok(())
    }

    /// Dispatch inbound events until `cancelled` resolves or the connection
    /// fails, then disconnect.
    ///
    /// Requires a prior `subscribe`. Steady-state failures are logged, never
    /// returned: the `LoopExit` tells the caller whether to re-subscribe.
    pub async fn run_loop<F>(&self, cancelled: F) -> Result<LoopExit>
    where
        F: Future<Output = ()>,
    {
        let mut source = self.source.lock().await;

        let state = self.state();
        if state != ListenerState::Subscribed {
            return Err(NotifyError::InvalidState {
                operation: "start listening",
                state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let Some(open) = source.as_mut() else {
            return Err(NotifyError::connection("no open change source connection"));
        };

        self.set_state(ListenerState::Listening);
        info!("Change listener running");

        tokio::pin!(cancelled);

        let exit = loop {
            tokio::select! {
                biased;

                _ = &mut cancelled => {
                    info!("Listening task cancelled");
                    break LoopExit::Cancelled;
                }

                received = open.recv() => match received {
                    Ok(notification) => self.handle_notification(notification).await,
                    Err(e) => {
                        error!("Error in listening loop: {e}");
                        break LoopExit::ConnectionLost;
                    }
                },
            }
        };

        // Close before releasing the lock so queued callers see it closed
        self.disconnect_locked(&mut source).await;

        Ok(exit)
    }

    /// Close the source connection. Idempotent; close failures are logged.
    pub async fn disconnect(&self) {
        let mut source = self.source.lock().await;
        self.disconnect_locked(&mut source).await;
    }

    /// Invoke every callback with `event`, sequentially and in order.
    /// Returns how many callbacks completed without error.
    pub async fn dispatch(&self, event: ChangeEvent) -> usize {
        // Snapshot so callbacks may register or remove listeners themselves
        let callbacks: Vec<(ListenerId, ChangeCallback)> = self
            .callbacks
            .read()
            .await
            .iter()
            .map(|registration| (registration.id, Arc::clone(&registration.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match callback(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => error!("Change listener {id} failed: {e}"),
            }
        }

        delivered
    }

    async fn handle_notification(&self, notification: RawNotification) {
        let event = match ChangeEvent::decode(&notification.payload) {
            Ok(event) => event,
            Err(e) => {
                error!(
                    "Dropping notification on channel {}: {e}",
                    notification.channel
                );
                return;
            }
        };

        debug!(
            "Received notification on channel {}: {:?}",
            notification.channel, event
        );

        self.dispatch(event).await;
    }

    async fn is_subscribed(&self, channel: &str) -> bool {
        self.channels.read().await.contains(channel)
    }

    async fn connect_locked(&self, source: &mut Option<C::Source>) -> Result<()> {
        if source.is_some() {
            return Ok(());
        }

        match self.connector.connect(&self.address).await {
            Ok(opened) => {
                *source = Some(opened);
                self.channels.write().await.clear();
                self.set_state(ListenerState::Connected);
                info!("Connected to change source");
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to change source: {e}");
                Err(e)
            }
        }
    }

    async fn disconnect_locked(&self, source: &mut Option<C::Source>) {
        self.channels.write().await.clear();

        if let Some(mut open) = source.take() {
            match open.close().await {
                Ok(()) => info!("Disconnected from change source"),
                Err(e) => warn!("Error closing change source connection: {e}"),
            }
        }

        self.set_state(ListenerState::Disconnected);
    }

    fn set_state(&self, state: ListenerState) {
        self.state.send_replace(state);
    }
}
