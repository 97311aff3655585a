//! Bridges database change notifications into the process.
//!
//! A [`ChangeListener`] owns one connection to a change source, subscribes to
//! a channel, decodes each raw payload into a [`ChangeEvent`] and hands it to
//! every registered callback in registration order.

pub mod change_event;
pub mod change_listener;
pub mod change_source;
pub mod error;
pub mod listener_state;
pub mod pg_source;

#[cfg(any(test, feature = "test-util"))]
pub mod memory_source;

#[cfg(test)]
mod tests;

pub use change_event::ChangeEvent;
pub use change_listener::{ChangeCallback, ChangeListener, ListenerId, LoopExit};
pub use change_source::{ChangeSource, ChangeSourceConnector, RawNotification};
pub use error::{NotifyError, Result};
pub use listener_state::ListenerState;
pub use pg_source::{PgChangeSource, PgConnector};

#[cfg(any(test, feature = "test-util"))]
pub use memory_source::{MemoryConnector, MemoryHandle};
