use std::sync::atomic::{AtomicUsize, Ordering};

use sqlx::PgPool;

/// Repository tests need a live PostgreSQL; they are skipped when this is unset.
pub const TEST_DATABASE_URL_ENV: &str = "INV_TEST_DATABASE_URL";

static CHANNEL_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
    pub channel: String,
}

/// Connects and migrates, or returns None when no test database is configured.
pub async fn try_create_test_db() -> Option<TestDb> {
    let Ok(url) = std::env::var(TEST_DATABASE_URL_ENV) else {
        eprintln!("{TEST_DATABASE_URL_ENV} not set, skipping database test");
        return None;
    };

    // Each test notifies on its own channel so parallel tests don't see each other
    let channel = format!(
        "inv_test_{}_{}",
        std::process::id(),
        CHANNEL_COUNTER.fetch_add(1, Ordering::SeqCst)
    );

    let pool = inv_db::connect_pool(&url, 2, &channel)
        .await
        .expect("Failed to connect to test database");

    inv_db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb { pool, url, channel })
}

/// Name that won't collide with rows written by other tests.
pub fn unique_name(prefix: &str) -> String {
    format!(
        "{prefix}-{}-{}",
        std::process::id(),
        CHANNEL_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
