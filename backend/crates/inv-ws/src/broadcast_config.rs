use inv_config::WebSocketConfig;

use std::time::Duration;

/// Configuration for hub fan-out
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// How long one send may wait on a full client queue before the client is dropped
    pub send_timeout: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_millis(1000),
        }
    }
}

impl From<&WebSocketConfig> for BroadcastConfig {
    fn from(config: &WebSocketConfig) -> Self {
        Self {
            send_timeout: Duration::from_millis(config.send_timeout_ms),
        }
    }
}
