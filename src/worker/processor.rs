// ============================================================================
// Envelope Processor
// ============================================================================
//
// Per-envelope processing logic for the persistence worker: decode the
// payload, insert it into the message store, and report a tagged outcome
// that tells the consume loop whether to acknowledge the delivery.
//
// The broker acknowledgment is issued strictly after the insert is
// confirmed. Acknowledging first and crashing before the insert would
// silently lose the message; inserting first and crashing before the ack
// only produces a duplicate row on redelivery.
//
// ============================================================================

use tracing::{debug, error, warn};

use crate::broker::types::MessageEnvelope;
use crate::db;
use crate::metrics;
use crate::worker::state::WorkerState;

/// Result of processing one delivered envelope.
///
/// This enum controls what the consume loop does with the broker delivery:
/// only `Committed` and `Dropped` may be acknowledged; `Redelivered` must be
/// nacked back to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Insert confirmed by the store - acknowledge the delivery
    Committed { message_id: i64 },
    /// Transient store failure - nack with requeue, the broker redelivers
    Redelivered,
    /// Undecodable or invalid envelope - acknowledge and discard
    Dropped,
}

/// Process a single delivered payload.
///
/// Decode failure is terminal and non-retryable: an unparsable payload can
/// never succeed, so it is dropped with a diagnostic record instead of being
/// redelivered forever. A store failure leaves the envelope to broker
/// redelivery - at-least-once, not exactly-once.
pub async fn process_delivery(state: &WorkerState, payload: &[u8]) -> ProcessOutcome {
    let envelope: MessageEnvelope = match serde_json::from_slice(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, payload_len = payload.len(), "Dropping undecodable envelope");
            metrics::ENVELOPES_DROPPED.inc();
            return ProcessOutcome::Dropped;
        }
    };

    if let Err(e) = envelope.validate() {
        warn!(error = %e, "Dropping invalid envelope");
        metrics::ENVELOPES_DROPPED.inc();
        return ProcessOutcome::Dropped;
    }

    match db::insert_message(&state.db_pool, &envelope).await {
        Ok(message_id) => {
            metrics::ENVELOPES_COMMITTED.inc();
            debug!(
                message_id,
                sender_id = %envelope.sender_id,
                receiver_id = %envelope.receiver_id,
                "Envelope persisted"
            );
            ProcessOutcome::Committed { message_id }
        }
        Err(e) => {
            error!(error = %e, "Insert failed, leaving envelope for redelivery");
            metrics::ENVELOPES_REDELIVERED.inc();
            ProcessOutcome::Redelivered
        }
    }
}
