use crate::{ChangeSource, ChangeSourceConnector, NotifyError, RawNotification, Result};

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::postgres::PgListener;

/// Connects to PostgreSQL for LISTEN/NOTIFY.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl ChangeSourceConnector for PgConnector {
    type Source = PgChangeSource;

    async fn connect(&self, address: &str) -> Result<PgChangeSource> {
        let listener = PgListener::connect(address).await?;
        Ok(PgChangeSource {
            listener,
            lost: false,
        })
    }
}

/// A dedicated PostgreSQL connection receiving notifications.
pub struct PgChangeSource {
    listener: PgListener,
    lost: bool,
}

#[async_trait]
impl ChangeSource for PgChangeSource {
    async fn listen(&mut self, channel: &str) -> Result<()> {
        self.listener.listen(channel).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<RawNotification> {
        // try_recv reports a lost connection as Ok(None); recv would quietly
        // reconnect and hide the gap from the loop's owner.
        match self.listener.try_recv().await {
            Ok(Some(notification)) => Ok(RawNotification {
                channel: notification.channel().to_string(),
                payload: Bytes::copy_from_slice(notification.payload().as_bytes()),
            }),
            Ok(None) => {
                self.lost = true;
                Err(NotifyError::connection(
                    "connection to change source was lost",
                ))
            }
            Err(e) => {
                self.lost = true;
                Err(e.into())
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        // PgListener reconnects on demand, so a lost connection is left alone
        if !self.lost {
            self.listener.unlisten_all().await?;
        }
        Ok(())
    }
}
