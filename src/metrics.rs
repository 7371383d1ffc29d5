use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, TextEncoder, opts, register_int_counter};

pub static ENVELOPES_PUBLISHED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "relay_envelopes_published_total",
        "Total number of envelopes published to the durable queue"
    ))
    .unwrap()
});

pub static ENVELOPES_COMMITTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "relay_envelopes_committed_total",
        "Total number of envelopes persisted and acknowledged"
    ))
    .unwrap()
});

pub static ENVELOPES_REDELIVERED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "relay_envelopes_redelivered_total",
        "Total number of envelopes returned to the broker for redelivery"
    ))
    .unwrap()
});

pub static ENVELOPES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "relay_envelopes_dropped_total",
        "Total number of undecodable envelopes acknowledged and discarded"
    ))
    .unwrap()
});

pub static HISTORY_ROWS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "relay_history_rows_skipped_total",
        "Total number of stored rows skipped during history queries because they failed to decode"
    ))
    .unwrap()
});

pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
