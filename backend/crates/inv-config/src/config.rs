use crate::database_config::redact_url;
use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR,
    DatabaseConfig, LoggingConfig, RelayConfig, ServerConfig, WebSocketConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub relay: RelayConfig,
    pub websocket: WebSocketConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for INV_CONFIG_DIR env var, else use ./.inventory/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply INV_* (and DATABASE_URL) environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: INV_CONFIG_DIR env var > ./.inventory/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.relay.validate()?;
        self.websocket.validate()?;

        Ok(())
    }

    /// Get bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Address the change listener connects to.
    pub fn relay_url(&self) -> &str {
        self.relay.url.as_deref().unwrap_or(&self.database.url)
    }

    /// Log configuration summary (credentials are redacted).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (max {} websocket clients)",
            self.server.host, self.server.port, self.server.max_connections
        );
        info!(
            "  database: {} (pool {})",
            redact_url(&self.database.url),
            self.database.max_connections
        );
        info!(
            "  relay: channel={}, source={}, required={}",
            self.relay.channel,
            redact_url(self.relay_url()),
            self.relay.required
        );
        info!(
            "  reconnect: {} (attempts={}, initial={}ms, max={}s, backoff={}x, jitter={})",
            if self.relay.reconnect.enabled {
                "enabled"
            } else {
                "disabled"
            },
            self.relay.reconnect.max_attempts,
            self.relay.reconnect.initial_delay_ms,
            self.relay.reconnect.max_delay_secs,
            self.relay.reconnect.backoff_multiplier,
            self.relay.reconnect.jitter
        );
        info!(
            "  websocket: buffer={}, send_timeout={}ms, heartbeat={}s/{}s",
            self.websocket.send_buffer_size,
            self.websocket.send_timeout_ms,
            self.websocket.heartbeat_interval_secs,
            self.websocket.heartbeat_timeout_secs
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("INV_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("INV_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse(
            "INV_SERVER_MAX_CONNECTIONS",
            &mut self.server.max_connections,
        );
        Self::apply_env_option_string("INV_SERVER_STATIC_DIR", &mut self.server.static_dir);

        // Database: the conventional DATABASE_URL first, INV_DATABASE_URL wins
        Self::apply_env_string("DATABASE_URL", &mut self.database.url);
        Self::apply_env_string("INV_DATABASE_URL", &mut self.database.url);
        Self::apply_env_parse(
            "INV_DATABASE_MAX_CONNECTIONS",
            &mut self.database.max_connections,
        );

        // Relay
        Self::apply_env_string("INV_RELAY_CHANNEL", &mut self.relay.channel);
        Self::apply_env_option_string("INV_RELAY_URL", &mut self.relay.url);
        Self::apply_env_bool("INV_RELAY_REQUIRED", &mut self.relay.required);
        Self::apply_env_bool(
            "INV_RELAY_RECONNECT_ENABLED",
            &mut self.relay.reconnect.enabled,
        );
        Self::apply_env_parse(
            "INV_RELAY_RECONNECT_MAX_ATTEMPTS",
            &mut self.relay.reconnect.max_attempts,
        );
        Self::apply_env_parse(
            "INV_RELAY_RECONNECT_INITIAL_DELAY_MS",
            &mut self.relay.reconnect.initial_delay_ms,
        );
        Self::apply_env_parse(
            "INV_RELAY_RECONNECT_MAX_DELAY_SECS",
            &mut self.relay.reconnect.max_delay_secs,
        );
        Self::apply_env_parse(
            "INV_RELAY_RECONNECT_BACKOFF_MULTIPLIER",
            &mut self.relay.reconnect.backoff_multiplier,
        );
        Self::apply_env_bool(
            "INV_RELAY_RECONNECT_JITTER",
            &mut self.relay.reconnect.jitter,
        );

        // WebSocket
        Self::apply_env_parse(
            "INV_WS_SEND_BUFFER_SIZE",
            &mut self.websocket.send_buffer_size,
        );
        Self::apply_env_parse(
            "INV_WS_SEND_TIMEOUT_MS",
            &mut self.websocket.send_timeout_ms,
        );
        Self::apply_env_parse(
            "INV_WS_HEARTBEAT_INTERVAL_SECS",
            &mut self.websocket.heartbeat_interval_secs,
        );
        Self::apply_env_parse(
            "INV_WS_HEARTBEAT_TIMEOUT_SECS",
            &mut self.websocket.heartbeat_timeout_secs,
        );

        // Logging
        Self::apply_env_parse("INV_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("INV_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("INV_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
