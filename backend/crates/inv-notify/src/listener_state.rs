use std::fmt;

use serde::Serialize;

/// Lifecycle of a [`ChangeListener`](crate::ChangeListener).
///
/// `Disconnected -> Connected -> Subscribed -> Listening -> Disconnected`.
/// Disconnected is re-entrant: a listener can connect and subscribe again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerState {
    Disconnected,
    Connected,
    Subscribed,
    Listening,
}

impl ListenerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Subscribed => "subscribed",
            Self::Listening => "listening",
        }
    }
}

impl fmt::Display for ListenerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
