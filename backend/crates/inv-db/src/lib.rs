pub mod error;
pub mod repositories;

pub use error::{DbError, Result};
pub use repositories::inventory_repository::InventoryRepository;

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

/// Schema migrations, including the trigger that publishes change events.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Session setting read by the notify trigger to pick its channel.
pub const NOTIFY_CHANNEL_SETTING: &str = "inventory.notify_channel";

/// Open a pool whose sessions notify on `channel`.
pub async fn connect_pool(url: &str, max_connections: u32, channel: &str) -> Result<PgPool> {
    let channel = channel.to_string();

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .after_connect(move |conn, _meta| {
            let channel = channel.clone();
            Box::pin(async move {
                conn.execute(
                    sqlx::query("SELECT set_config($1, $2, false)")
                        .bind(NOTIFY_CHANNEL_SETTING)
                        .bind(channel),
                )
                .await?;
                Ok(())
            })
        })
        .connect(url)
        .await?;

    Ok(pool)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
