use anyhow::{Context, Result};
use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};
use tracing::info;

use crate::config::{BrokerConfig, WorkerConfig};

/// Manually-acknowledged consumer over the durable queue.
///
/// Acknowledgment is the caller's responsibility: an envelope stays owned by
/// the broker until the caller acks it, and a consumer crash returns every
/// unacknowledged envelope to the queue for redelivery.
pub struct EnvelopeConsumer {
    inner: lapin::Consumer,
    // The channel and connection close when dropped; keeping them alive for
    // the consumer's lifetime is what keeps deliveries flowing.
    _channel: lapin::Channel,
    _connection: Connection,
}

impl EnvelopeConsumer {
    /// Connect to the broker and start consuming.
    ///
    /// Declares the queue idempotently (durable, not exclusive, not
    /// auto-deleted) so producer and consumer can start in either order, and
    /// caps in-flight deliveries at the configured prefetch.
    pub async fn connect(broker: &BrokerConfig, worker: &WorkerConfig) -> Result<Self> {
        let connection = Connection::connect(&broker.url, ConnectionProperties::default())
            .await
            .context("Failed to connect to broker")?;

        let channel = connection
            .create_channel()
            .await
            .context("Failed to open broker channel")?;

        channel
            .basic_qos(worker.prefetch, BasicQosOptions::default())
            .await
            .context("Failed to set prefetch")?;

        channel
            .queue_declare(
                &broker.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("Queue declaration failed")?;

        // BasicConsumeOptions::default() leaves no_ack off: manual
        // acknowledgment mode.
        let inner = channel
            .basic_consume(
                &broker.queue,
                &worker.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .context("Failed to start consuming")?;

        info!(
            queue = %broker.queue,
            consumer_tag = %worker.consumer_tag,
            prefetch = worker.prefetch,
            "Consuming from durable queue"
        );

        Ok(Self {
            inner,
            _channel: channel,
            _connection: connection,
        })
    }

    /// Await the next delivery. Returns `None` when the broker closes the
    /// consumer stream.
    pub async fn next(&mut self) -> Option<lapin::Result<Delivery>> {
        self.inner.next().await
    }
}
