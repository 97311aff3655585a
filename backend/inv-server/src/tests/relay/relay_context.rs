use crate::tests::hub;
use crate::{RelayContext, ServerError};

use inv_config::{ReconnectConfig, RelayConfig};
use inv_notify::{ListenerState, MemoryConnector};
use inv_ws::ClientConnection;

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep, timeout};

const CHANNEL: &str = "inventory_channel";
const ADDRESS: &str = "memory://inventory";
const WAIT: Duration = Duration::from_secs(2);

fn relay_config(required: bool, reconnect: bool) -> RelayConfig {
    RelayConfig {
        channel: CHANNEL.to_string(),
        url: None,
        required,
        reconnect: ReconnectConfig {
            enabled: reconnect,
            max_attempts: 0,
            initial_delay_ms: 10,
            max_delay_secs: 1,
            backoff_multiplier: 2.0,
            jitter: false,
        },
    }
}

async fn wait_for_state(relay: &RelayContext<MemoryConnector>, expected: ListenerState) {
    let mut state = relay.watch_state();
    timeout(WAIT, state.wait_for(|s| *s == expected))
        .await
        .expect("timed out waiting for relay state")
        .unwrap();
}

async fn wait_until(condition: impl Fn() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}

#[tokio::test]
async fn given_running_relay_when_row_changes_then_hub_client_receives_event() {
    let connector = MemoryConnector::new();
    let handle = connector.handle();
    let hub = hub(4);
    let (tx, mut rx) = mpsc::channel(8);
    hub.register(ClientConnection::new(tx)).await.unwrap();

    let relay = RelayContext::start(connector, ADDRESS, hub.clone(), &relay_config(true, true))
        .await
        .unwrap();
    wait_for_state(&relay, ListenerState::Listening).await;

    assert!(handle.notify(
        CHANNEL,
        r#"{"operation":"UPDATE","table":"inventory","id":1,"name":"Widget","quantity":5}"#,
    ));

    let Some(Message::Text(text)) = timeout(WAIT, rx.recv()).await.unwrap() else {
        panic!("expected a text frame");
    };
    let event: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(event["operation"], "UPDATE");
    assert_eq!(event["quantity"], 5);

    relay.shutdown().await;
}

#[tokio::test]
async fn given_required_relay_when_source_unreachable_then_start_fails() {
    let connector = MemoryConnector::new();
    connector.handle().set_unreachable(true);

    let result = RelayContext::start(connector, ADDRESS, hub(4), &relay_config(true, true)).await;

    assert!(matches!(result, Err(ServerError::Relay(_))));
}

#[tokio::test]
async fn given_optional_relay_when_source_comes_up_later_then_starts_listening() {
    let connector = MemoryConnector::new();
    let handle = connector.handle();
    handle.set_unreachable(true);

    let relay = RelayContext::start(connector, ADDRESS, hub(4), &relay_config(false, true))
        .await
        .unwrap();
    assert_eq!(relay.state(), ListenerState::Disconnected);

    handle.set_unreachable(false);

    wait_for_state(&relay, ListenerState::Listening).await;
    assert_eq!(handle.listen_calls(), vec![CHANNEL.to_string()]);

    relay.shutdown().await;
}

#[tokio::test]
async fn given_listening_relay_when_connection_drops_then_resubscribes() {
    let connector = MemoryConnector::new();
    let handle = connector.handle();

    let relay = RelayContext::start(connector, ADDRESS, hub(4), &relay_config(true, true))
        .await
        .unwrap();
    wait_for_state(&relay, ListenerState::Listening).await;

    handle.drop_connection();

    wait_until(|| handle.connect_count() == 2).await;
    wait_for_state(&relay, ListenerState::Listening).await;
    assert_eq!(handle.listen_calls().len(), 2);
    assert!(handle.notify(CHANNEL, r#"{"id":2}"#));

    relay.shutdown().await;
}

#[tokio::test]
async fn given_reconnect_disabled_when_connection_drops_then_stays_disconnected() {
    let connector = MemoryConnector::new();
    let handle = connector.handle();

    let relay = RelayContext::start(connector, ADDRESS, hub(4), &relay_config(true, false))
        .await
        .unwrap();
    wait_for_state(&relay, ListenerState::Listening).await;

    handle.drop_connection();

    wait_for_state(&relay, ListenerState::Disconnected).await;
    sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.connect_count(), 1);
    assert_eq!(relay.state(), ListenerState::Disconnected);

    relay.shutdown().await;
}

#[tokio::test]
async fn given_listening_relay_when_shut_down_then_closes_connection_once() {
    let connector = MemoryConnector::new();
    let handle = connector.handle();

    let relay = RelayContext::start(connector, ADDRESS, hub(4), &relay_config(true, true))
        .await
        .unwrap();
    wait_for_state(&relay, ListenerState::Listening).await;
    let listener = relay.listener().clone();

    timeout(WAIT, relay.shutdown()).await.unwrap();

    assert!(!handle.is_open());
    assert_eq!(handle.close_count(), 1);
    assert_eq!(listener.state(), ListenerState::Disconnected);
}
