use anyhow::{Context, Result};
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};
use tracing::info;

use crate::config::BrokerConfig;
use crate::metrics;
use super::types::MessageEnvelope;

/// Durable-queue publisher for the ingestion path.
///
/// The connection is opened once at startup; each publish opens its own
/// short-lived channel, re-declares the queue idempotently, and waits for a
/// broker confirm. A confirmed publish means "durably queued," not "visible
/// to readers."
pub struct EnvelopePublisher {
    connection: Connection,
    queue: String,
}

impl EnvelopePublisher {
    /// Connect to the broker.
    ///
    /// Failure here is a startup error; the API process should not come up
    /// without a broker connection.
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .context("Failed to connect to broker")?;

        info!(queue = %config.queue, "Broker publisher connected");

        Ok(Self {
            connection,
            queue: config.queue.clone(),
        })
    }

    /// Publish one envelope to the durable queue.
    ///
    /// Queue declaration is idempotent: durable, not exclusive, not
    /// auto-deleted. There is no internal retry; on any failure the caller
    /// receives the error and owns the retry decision.
    pub async fn publish(&self, envelope: &MessageEnvelope) -> Result<()> {
        let channel = self
            .connection
            .create_channel()
            .await
            .context("Failed to open broker channel")?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .context("Failed to enable publisher confirms")?;

        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("Queue declaration failed")?;

        let payload = serde_json::to_vec(envelope).context("Failed to serialize envelope")?;

        let confirmation = channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await
            .context("Failed to publish envelope")?
            .await
            .context("Broker did not confirm publish")?;

        if let Confirmation::Nack(_) = confirmation {
            anyhow::bail!("Broker rejected envelope publish");
        }

        metrics::ENVELOPES_PUBLISHED.inc();

        Ok(())
    }

    /// Whether the underlying broker connection is still open
    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }
}
