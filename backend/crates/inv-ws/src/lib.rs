//! Live push side of the relay.
//!
//! [`BroadcastHub`] owns the set of connected WebSocket clients and fans each
//! change event out to all of them. [`WebSocketConnection`] drives one client
//! from upgrade to close.

pub mod app_state;
pub mod broadcast_config;
pub mod broadcast_hub;
pub mod broadcast_outcome;
pub mod client_connection;
pub mod connection_config;
pub mod connection_id;
pub mod connection_limits;
pub mod error;
pub mod metrics;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod web_socket_connection;

pub use app_state::{AppState, handler};
pub use broadcast_config::BroadcastConfig;
pub use broadcast_hub::BroadcastHub;
pub use broadcast_outcome::BroadcastOutcome;
pub use client_connection::ClientConnection;
pub use connection_config::ConnectionConfig;
pub use connection_id::ConnectionId;
pub use connection_limits::ConnectionLimits;
pub use error::{Result, WsError};
pub use metrics::Metrics;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use web_socket_connection::WebSocketConnection;

#[cfg(test)]
mod tests;
