// ============================================================================
// Persistence Worker
// ============================================================================
//
// Long-lived consumer loop draining the durable queue into the message
// store. Logically single-threaded per instance; multiple instances may run
// against the same queue and the broker load-balances deliveries between
// them.
//
// ============================================================================

pub mod processor;
pub mod state;

pub use processor::{process_delivery, ProcessOutcome};
pub use state::WorkerState;

use anyhow::{Context, Result};
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use std::time::Duration;
use tracing::info;

use crate::broker::EnvelopeConsumer;

/// Run the consume loop until the broker closes the stream or a shutdown
/// signal arrives.
///
/// The loop is a blocking pull: it suspends awaiting the next delivery for
/// as long as the queue is empty. On shutdown, an envelope still in flight
/// stays unacknowledged and the broker redelivers it to another instance.
pub async fn run(state: WorkerState, mut consumer: EnvelopeConsumer) -> Result<()> {
    info!("Persistence worker listening for envelopes");

    loop {
        tokio::select! {
            delivery = consumer.next() => {
                match delivery {
                    Some(Ok(delivery)) => handle_delivery(&state, delivery).await?,
                    Some(Err(e)) => {
                        return Err(e).context("Broker delivery stream failed");
                    }
                    None => {
                        anyhow::bail!("Broker closed the consumer stream");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping worker");
                return Ok(());
            }
        }
    }
}

/// Map the processing outcome onto the broker acknowledgment.
///
/// Ack-after-commit: `Committed` and `Dropped` acknowledge the delivery,
/// `Redelivered` nacks it back onto the queue. An ack/nack failure means the
/// channel is gone; the error propagates and the process exits, leaving the
/// envelope for broker-driven redelivery.
async fn handle_delivery(state: &WorkerState, delivery: Delivery) -> Result<()> {
    match process_delivery(state, &delivery.data).await {
        ProcessOutcome::Committed { .. } | ProcessOutcome::Dropped => {
            delivery
                .ack(BasicAckOptions::default())
                .await
                .context("Failed to acknowledge delivery")?;
        }
        ProcessOutcome::Redelivered => {
            delivery
                .nack(BasicNackOptions {
                    requeue: true,
                    ..Default::default()
                })
                .await
                .context("Failed to nack delivery")?;

            // Brief pause so a store outage does not spin the requeue loop
            tokio::time::sleep(Duration::from_millis(
                state.config.worker.redeliver_backoff_ms,
            ))
            .await;
        }
    }

    Ok(())
}
