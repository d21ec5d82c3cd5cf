//! Test fixtures and helpers.
//!
//! Common setup code for aggregation and producer tests.

use rand::RngCore;

use silo_core::{AggregatedMessage, AggregatorConfig, RecordAggregator};
use silo_transport::MemoryTransport;

/// A test fixture with an aggregator and an in-memory transport.
pub struct TestFixture {
    pub aggregator: RecordAggregator,
    pub transport: MemoryTransport,
}

impl TestFixture {
    /// Create a fixture with default thresholds.
    pub fn new() -> Self {
        Self {
            aggregator: RecordAggregator::new(),
            transport: MemoryTransport::new(),
        }
    }

    /// Create a fixture with explicit thresholds.
    pub fn with_config(config: AggregatorConfig) -> Self {
        Self {
            aggregator: RecordAggregator::with_config(config),
            transport: MemoryTransport::new(),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A payload of `len` bytes, every byte `fill`.
pub fn patterned_payload(len: usize, fill: u8) -> Vec<u8> {
    vec![fill; len]
}

/// A payload of `len` random bytes.
pub fn random_payload(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

/// Add `record_len`-byte records under `key` until the aggregator flushes.
///
/// Returns the flushed message and how many records it contains (the
/// triggering record stays behind in the buffer).
pub fn fill_until_flush(
    aggregator: &mut RecordAggregator,
    key: &str,
    record_len: usize,
) -> (AggregatedMessage, usize) {
    let payload = patterned_payload(record_len, 0xa5);
    let mut added = 0usize;
    loop {
        match aggregator
            .add_record(key, &payload)
            .expect("add_record failed while filling")
        {
            Some(message) => return (message, added),
            None => added += 1,
        }
    }
}
