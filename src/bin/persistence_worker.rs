use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_server::broker::EnvelopeConsumer;
use relay_server::config::Config;
use relay_server::db;
use relay_server::worker::{self, WorkerState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Mask credentials in the broker URL for logging
    let amqp_url_safe = if let Some(at_pos) = config.broker.url.find('@') {
        let protocol_end = config.broker.url.find("://").map(|p| p + 3).unwrap_or(0);
        format!(
            "{}***{}",
            &config.broker.url[..protocol_end],
            &config.broker.url[at_pos..]
        )
    } else {
        config.broker.url.clone()
    };
    info!("Connecting to broker at: {}", amqp_url_safe);

    // Connect to the message store; failure here is fatal
    let db_pool = db::create_pool(&config)
        .await
        .context("Failed to connect to the database")?;
    info!("Connected to database");

    // Connect to the broker and start consuming; failure here is fatal
    let consumer = EnvelopeConsumer::connect(&config.broker, &config.worker)
        .await
        .context("Failed to connect to the broker")?;

    info!("Persistence worker started");
    info!("Queue: {}", config.broker.queue);

    let state = WorkerState::new(db_pool, Arc::new(config));

    worker::run(state, consumer).await
}
