use inv_server::{RelayContext, build_router, logger};

use inv_config::Config;
use inv_notify::PgConnector;
use inv_ws::{
    AppState, BroadcastConfig, BroadcastHub, ConnectionConfig, ConnectionLimits, Metrics,
    ShutdownCoordinator,
};

use std::error::Error;
use std::path::PathBuf;

use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Pick up a local .env before reading INV_* overrides
    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<PathBuf> = if let Some(ref filename) = config.logging.file {
        let config_dir = Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);

        // Ensure log directory exists
        std::fs::create_dir_all(&log_dir)?;

        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting inv-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Initialize database pool
    let pool = inv_db::connect_pool(
        &config.database.url,
        config.database.max_connections,
        &config.relay.channel,
    )
    .await?;
    info!("Database connection established");

    // Run migrations
    info!("Running database migrations...");
    inv_db::run_migrations(&pool).await?;
    info!("Migrations complete");

    let metrics = Metrics::new();
    let shutdown = ShutdownCoordinator::new();

    let hub = BroadcastHub::new(
        ConnectionLimits {
            max_total: config.server.max_connections,
        },
        BroadcastConfig::from(&config.websocket),
        metrics.clone(),
    );

    // Start the change relay (database notifications -> hub)
    let relay = RelayContext::start(
        PgConnector,
        config.relay_url(),
        hub.clone(),
        &config.relay,
    )
    .await?;

    // Build application state
    let app_state = AppState {
        pool: pool.clone(),
        hub,
        metrics,
        shutdown: shutdown.clone(),
        config: ConnectionConfig::from(&config.websocket),
        relay_state: relay.watch_state(),
    };

    // Build router
    let app = build_router(app_state, config.server.static_dir.as_deref());

    // Create TCP listener
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;

    let actual_addr = listener.local_addr()?;
    info!("Server listening on {actual_addr}");

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {e}");
            }
        }
    });

    // Start server with graceful shutdown
    info!("Server ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            info!("HTTP server stopped accepting connections");
        })
        .await?;

    relay.shutdown().await;
    pool.close().await;
    info!("Graceful shutdown complete");

    Ok(())
}
