use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection closed: {reason} {location}")]
    ConnectionClosed {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Send timed out after {timeout_ms}ms, client too slow {location}")]
    SendTimeout {
        timeout_ms: u64,
        location: ErrorLocation,
    },

    #[error("Connection limit exceeded: {current} connections (max: {max}) {location}")]
    ConnectionLimitExceeded {
        current: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Heartbeat timeout after {timeout_secs}s {location}")]
    HeartbeatTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Failed to serialize message: {source} {location}")]
    Serialize {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },
}

impl WsError {
    #[track_caller]
    pub fn connection_closed<S: Into<String>>(reason: S) -> Self {
        Self::ConnectionClosed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionClosed { .. } => "connection_closed",
            Self::SendTimeout { .. } => "send_timeout",
            Self::ConnectionLimitExceeded { .. } => "connection_limit",
            Self::HeartbeatTimeout { .. } => "heartbeat_timeout",
            Self::Serialize { .. } => "serialize",
        }
    }
}

impl From<serde_json::Error> for WsError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, WsError>;
