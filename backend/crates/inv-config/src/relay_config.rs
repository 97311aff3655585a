use crate::database_config::is_postgres_url;
use crate::{ConfigError, ConfigErrorResult, DEFAULT_CHANNEL, MAX_CHANNEL_LENGTH, ReconnectConfig};

use serde::Deserialize;

/// Change-notification relay settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// LISTEN channel the database trigger notifies on
    pub channel: String,
    /// Change source address; falls back to `database.url`
    pub url: Option<String>,
    /// Abort startup when the first subscribe fails
    pub required: bool,
    pub reconnect: ReconnectConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            channel: String::from(DEFAULT_CHANNEL),
            url: None,
            required: false,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        // Postgres identifiers: at most 63 bytes, no quoting needed
        let valid_channel = !self.channel.is_empty()
            && self.channel.len() <= MAX_CHANNEL_LENGTH
            && self
                .channel
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !self.channel.starts_with(|c: char| c.is_ascii_digit());

        if !valid_channel {
            return Err(ConfigError::relay(format!(
                "relay.channel must be 1-{} characters of [A-Za-z0-9_] not starting with a digit, got '{}'",
                MAX_CHANNEL_LENGTH, self.channel
            )));
        }

        if let Some(url) = &self.url
            && !is_postgres_url(url)
        {
            return Err(ConfigError::relay(
                "relay.url must start with postgres:// or postgresql://",
            ));
        }

        self.reconnect.validate()
    }
}
