use crate::Backoff;
use crate::error::{Result as ServerErrorResult, ServerError};

use inv_config::{ReconnectConfig, RelayConfig};
use inv_notify::{ChangeEvent, ChangeListener, ChangeSourceConnector, ListenerState, LoopExit};
use inv_ws::{BroadcastHub, ShutdownCoordinator, ShutdownGuard};

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Owns the change listener and the background task that keeps it running.
///
/// Created once at startup and torn down with [`RelayContext::shutdown`];
/// nothing else holds the listener's connection.
pub struct RelayContext<C: ChangeSourceConnector> {
    listener: Arc<ChangeListener<C>>,
    shutdown: ShutdownCoordinator,
    task: JoinHandle<()>,
}

impl<C: ChangeSourceConnector> RelayContext<C> {
    /// Route every change event into `hub`, subscribe, and start the
    /// supervisor.
    ///
    /// A failed first subscribe is returned when `config.required` is set;
    /// otherwise it is logged and the supervisor keeps retrying in the
    /// background.
    pub async fn start(
        connector: C,
        address: impl Into<String>,
        hub: BroadcastHub,
        config: &RelayConfig,
    ) -> ServerErrorResult<Self> {
        let listener = Arc::new(ChangeListener::new(connector, address));

        listener
            .add_listener(move |event: ChangeEvent| {
                let hub = hub.clone();
                async move {
                    let outcome = hub.broadcast(&event).await;
                    debug!(
                        "Relayed change event to {} client(s), pruned {}",
                        outcome.delivered, outcome.pruned
                    );
                    Ok(())
                }
            })
            .await;

        let subscribed = match listener.subscribe(&config.channel).await {
            Ok(()) => true,
            Err(e) if config.required => {
                error!("Relay is required but could not subscribe: {e}");
                return Err(ServerError::Relay(e));
            }
            Err(e) => {
                warn!("Relay unavailable at startup, live updates are paused: {e}");
                listener.disconnect().await;
                false
            }
        };

        let shutdown = ShutdownCoordinator::new();
        let task = tokio::spawn(supervise(
            Arc::clone(&listener),
            config.channel.clone(),
            config.reconnect.clone(),
            shutdown.subscribe_guard(),
            subscribed,
        ));

        Ok(Self {
            listener,
            shutdown,
            task,
        })
    }

    pub fn state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Listener state for health reporting.
    pub fn watch_state(&self) -> watch::Receiver<ListenerState> {
        self.listener.watch_state()
    }

    pub fn listener(&self) -> &Arc<ChangeListener<C>> {
        &self.listener
    }

    /// Cancel the supervisor, wait for it, and close the connection.
    pub async fn shutdown(self) {
        info!("Stopping change relay");
        self.shutdown.shutdown();

        if let Err(e) = self.task.await {
            error!("Relay supervisor task failed: {e}");
        }

        self.listener.disconnect().await;
        info!("Change relay stopped");
    }
}

async fn supervise<C: ChangeSourceConnector>(
    listener: Arc<ChangeListener<C>>,
    channel: String,
    reconnect: ReconnectConfig,
    mut shutdown: ShutdownGuard,
    mut subscribed: bool,
) {
    let mut backoff = Backoff::new(&reconnect);

    loop {
        if !subscribed {
            if !reconnect.enabled {
                warn!("Relay reconnect is disabled, live updates stay paused");
                return;
            }

            let Some(delay) = backoff.next_delay() else {
                error!(
                    "Relay gave up after {} reconnect attempts, live updates stay paused",
                    backoff.attempts()
                );
                return;
            };

            info!(
                "Re-subscribing to {channel} in {delay:?} (attempt {})",
                backoff.attempts()
            );
            tokio::select! {
                _ = shutdown.wait() => return,
                _ = sleep(delay) => {}
            }

            match listener.subscribe(&channel).await {
                Ok(()) => {
                    info!(
                        "Relay re-subscribed to {channel} after {} attempt(s)",
                        backoff.attempts()
                    );
                    backoff.reset();
                    subscribed = true;
                }
                Err(e) => {
                    warn!("Re-subscribe attempt {} failed: {e}", backoff.attempts());
                    listener.disconnect().await;
                    continue;
                }
            }
        }

        match listener.run_loop(shutdown.wait()).await {
            Ok(LoopExit::Cancelled) => return,
            Ok(LoopExit::ConnectionLost) => {
                warn!("Relay lost its change source connection, events until reconnect are lost");
            }
            Err(e) => {
                error!("Relay could not start listening: {e}");
                listener.disconnect().await;
            }
        }
        subscribed = false;
    }
}
