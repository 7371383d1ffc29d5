use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod broker;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod worker;

use broker::EnvelopePublisher;
use config::Config;
use context::AppContext;

/// Run the relay API server: the ingestion and query gates over shared
/// pooled handles, with graceful shutdown on ctrl-c.
pub async fn run() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    // Connect to the message store
    let db_pool = Arc::new(
        db::create_pool(&config)
            .await
            .context("Failed to connect to the database")?,
    );
    tracing::info!("Connected to database");

    // Apply database migrations
    sqlx::migrate!()
        .run(&*db_pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // Connect to the broker
    let publisher = Arc::new(
        EnvelopePublisher::connect(&config.broker)
            .await
            .context("Failed to connect to the broker")?,
    );

    // Create application context
    let app_context = Arc::new(AppContext::new(db_pool, publisher, config.clone()));

    let app = routes::create_router(app_context);

    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Relay server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server shutdown")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, shutting down");
}
