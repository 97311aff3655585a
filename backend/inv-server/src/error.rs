use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] inv_config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] inv_db::DbError),

    #[error("Relay error: {0}")]
    Relay(#[from] inv_notify::NotifyError),

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
