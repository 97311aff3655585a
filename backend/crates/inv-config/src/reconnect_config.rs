use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

// 0 = retry until shutdown
pub const MAX_MAX_ATTEMPTS: u32 = 1000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 0;

pub const MIN_INITIAL_DELAY_MS: u64 = 10;
pub const MAX_INITIAL_DELAY_MS: u64 = 60000;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

pub const MIN_MAX_DELAY_SECS: u64 = 1;
pub const MAX_MAX_DELAY_SECS: u64 = 300;
pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;

pub const MIN_BACKOFF_MULTIPLIER: f64 = 1.0;
pub const MAX_BACKOFF_MULTIPLIER: f64 = 10.0;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Policy for re-subscribing after the change source connection drops.
///
/// Events emitted while the relay is disconnected are not replayed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    /// Attempts per outage before the relay gives up (0 = unlimited)
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_secs: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: true,
        }
    }
}

impl ReconnectConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_attempts > MAX_MAX_ATTEMPTS {
            return Err(ConfigError::relay(format!(
                "relay.reconnect.max_attempts must be 0-{}, got {}",
                MAX_MAX_ATTEMPTS, self.max_attempts
            )));
        }

        if self.initial_delay_ms < MIN_INITIAL_DELAY_MS
            || self.initial_delay_ms > MAX_INITIAL_DELAY_MS
        {
            return Err(ConfigError::relay(format!(
                "relay.reconnect.initial_delay_ms must be {}-{}, got {}",
                MIN_INITIAL_DELAY_MS, MAX_INITIAL_DELAY_MS, self.initial_delay_ms
            )));
        }

        if self.max_delay_secs < MIN_MAX_DELAY_SECS || self.max_delay_secs > MAX_MAX_DELAY_SECS {
            return Err(ConfigError::relay(format!(
                "relay.reconnect.max_delay_secs must be {}-{}, got {}",
                MIN_MAX_DELAY_SECS, MAX_MAX_DELAY_SECS, self.max_delay_secs
            )));
        }

        if self.backoff_multiplier < MIN_BACKOFF_MULTIPLIER
            || self.backoff_multiplier > MAX_BACKOFF_MULTIPLIER
        {
            return Err(ConfigError::relay(format!(
                "relay.reconnect.backoff_multiplier must be {}-{}, got {}",
                MIN_BACKOFF_MULTIPLIER, MAX_BACKOFF_MULTIPLIER, self.backoff_multiplier
            )));
        }

        Ok(())
    }
}
