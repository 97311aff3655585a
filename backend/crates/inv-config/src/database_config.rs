use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_DATABASE_URL, DEFAULT_POOL_SIZE, MAX_POOL_SIZE,
    MIN_POOL_SIZE,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_DATABASE_URL),
            max_connections: DEFAULT_POOL_SIZE,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !is_postgres_url(&self.url) {
            return Err(ConfigError::database(
                "database.url must start with postgres:// or postgresql://",
            ));
        }

        if self.max_connections < MIN_POOL_SIZE || self.max_connections > MAX_POOL_SIZE {
            return Err(ConfigError::database(format!(
                "database.max_connections must be {}-{}, got {}",
                MIN_POOL_SIZE, MAX_POOL_SIZE, self.max_connections
            )));
        }

        Ok(())
    }
}

pub(crate) fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// Replace the password of a connection string so it can be logged.
pub(crate) fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return String::from("<invalid url>");
    };

    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_string(),
    }
}
