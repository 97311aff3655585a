use crate::ListenerState;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failures inside the relay.
///
/// Only `Connection` and `InvalidState` ever reach a caller, and only from
/// `connect`/`subscribe`/`run_loop` setup. Decode and delivery failures are
/// logged and contained inside the listening loop.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Change source connection failed: {message} {location}")]
    Connection {
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed change payload: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Change delivery failed: {message} {location}")]
    Delivery {
        message: String,
        location: ErrorLocation,
    },

    #[error("Cannot {operation} while {state} {location}")]
    InvalidState {
        operation: &'static str,
        state: ListenerState,
        location: ErrorLocation,
    },
}

impl NotifyError {
    #[track_caller]
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl From<sqlx::Error> for NotifyError {
    #[track_caller]
    fn from(source: sqlx::Error) -> Self {
        Self::Connection {
            message: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
