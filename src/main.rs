//! Rimappa - Application Entry Point
//!
//! This is the main entry point for the Rimappa server.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rimappa::{
    build_router,
    config::Config,
    db,
    import::MapTilerGeocoder,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rimappa server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database)
        .await
        .context("Could not connect to the database")?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool)
        .await
        .context("Database migrations failed")?;

    let geocoder = MapTilerGeocoder::new(&config.geocoding)
        .context("Could not build the geocoding client")?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState::new(db_pool, Arc::new(geocoder), config);

    // Build the router
    let app = build_router(state)?;

    // Start the server
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
