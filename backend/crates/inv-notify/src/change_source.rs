use crate::Result;

use async_trait::async_trait;
use bytes::Bytes;

/// A notification as it arrives from the source, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    pub channel: String,
    pub payload: Bytes,
}

impl RawNotification {
    pub fn new(channel: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// An open connection to a publish/subscribe change feed.
#[async_trait]
pub trait ChangeSource: Send {
    /// Start receiving notifications for `channel`.
    async fn listen(&mut self, channel: &str) -> Result<()>;

    /// Wait for the next notification.
    ///
    /// Must be cancel safe: dropping the future loses no notification.
    /// A dropped connection is reported as `NotifyError::Connection`.
    async fn recv(&mut self) -> Result<RawNotification>;

    /// Release the connection. The source is dropped afterwards.
    async fn close(&mut self) -> Result<()>;
}

/// Opens [`ChangeSource`]s from an address.
#[async_trait]
pub trait ChangeSourceConnector: Send + Sync + 'static {
    type Source: ChangeSource + 'static;

    async fn connect(&self, address: &str) -> Result<Self::Source>;
}
