//! The aggregation buffer.
//!
//! [`RecordAggregator`] accepts records one at a time, deduplicates their
//! partition keys, tracks the projected encoded size, and on demand (or when
//! forced by the size ceiling) serializes its contents into a single framed
//! aggregate ready for transport submission.
//!
//! The aggregator is a plain single-owner mutable object: all operations run
//! synchronously on the calling thread, perform no I/O, and require external
//! mutual exclusion for concurrent producers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::table::PartitionKeyTable;
use crate::wire::{self, AggregatedPayload, WireRecord, FRAMING_OVERHEAD};

/// Hard ceiling on the framed, encoded size of one aggregate.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Default bound above which a single record bypasses aggregation.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 20 * 1024;

/// Per-record bookkeeping cost charged for carrying a key-table index.
pub const PARTITION_KEY_INDEX_OVERHEAD: usize = 8;

/// Aggregator size thresholds, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// The aggregator never knowingly produces a framed message at or above
    /// this size.
    pub max_message_size: usize,
    /// Records at or above this size skip aggregation entirely and travel
    /// as standalone messages.
    pub max_record_size: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }
}

/// One outbound message, ready for transport submission.
///
/// Either a framed aggregate (magic number, serialized body, digest) or a
/// bypassed record travelling verbatim. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedMessage {
    /// The bytes to submit.
    pub data: Bytes,
    /// The partition key routing this message: the representative key of an
    /// aggregate, or the record's own key for a bypassed record.
    pub partition_key: String,
}

impl AggregatedMessage {
    /// Whether this message carries the aggregate framing.
    pub fn is_aggregated(&self) -> bool {
        wire::is_framed(&self.data)
    }
}

/// A record held in the buffer between add and flush.
#[derive(Debug, Clone)]
struct BufferedRecord {
    data: Bytes,
    partition_key_index: u64,
}

/// The record aggregation buffer.
///
/// Accumulates small records into one size-bounded aggregate, deduplicating
/// partition keys into an index table so each key's bytes are carried once.
#[derive(Debug, Clone, Default)]
pub struct RecordAggregator {
    config: AggregatorConfig,
    table: PartitionKeyTable,
    /// Partition key of the first record admitted since the last flush;
    /// routes the aggregate as a whole.
    representative_key: Option<String>,
    records: Vec<BufferedRecord>,
    /// Bytes charged so far: payloads, per-record index overhead, and each
    /// distinct key once. Framing overhead is added per estimate.
    accumulated_size: usize,
}

impl RecordAggregator {
    /// Create an aggregator with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator with explicit thresholds.
    pub fn with_config(config: AggregatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of buffered, not-yet-flushed records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// The configured thresholds.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Add one record to the buffer.
    ///
    /// Returns `Ok(Some(message))` in exactly two cases, mutually exclusive
    /// per call:
    ///
    /// - the payload is at or above the bypass bound, in which case the
    ///   buffer is untouched and the payload is returned verbatim as a
    ///   standalone message;
    /// - admitting the record would push the buffer past the size ceiling,
    ///   in which case the *current* contents are flushed and returned, and
    ///   the new record is admitted into the now-empty buffer (it is not
    ///   part of the returned message).
    ///
    /// On an encoding failure during a forced flush the buffer is left
    /// untouched and the same call may be retried.
    pub fn add_record(
        &mut self,
        partition_key: &str,
        payload: &[u8],
    ) -> Result<Option<AggregatedMessage>, CoreError> {
        if payload.len() >= self.config.max_record_size {
            return Ok(Some(AggregatedMessage {
                data: Bytes::copy_from_slice(payload),
                partition_key: partition_key.to_string(),
            }));
        }

        let mut flushed = None;
        let projected = self.estimated_size()
            + payload.len()
            + partition_key.len()
            + PARTITION_KEY_INDEX_OVERHEAD;
        if !self.records.is_empty() && projected >= self.config.max_message_size {
            flushed = Some(self.flush()?);
        }

        let (index, newly_assigned) = self.table.intern(partition_key);
        if newly_assigned {
            self.accumulated_size += partition_key.len();
        }
        if self.representative_key.is_none() {
            self.representative_key = Some(partition_key.to_string());
        }
        self.records.push(BufferedRecord {
            data: Bytes::copy_from_slice(payload),
            partition_key_index: index,
        });
        self.accumulated_size += payload.len() + PARTITION_KEY_INDEX_OVERHEAD;

        Ok(flushed)
    }

    /// Serialize and frame the buffered records, then reset the session.
    ///
    /// The key table is materialized in assignment order, so the index
    /// stored in each record resolves to the key that was supplied when the
    /// record was added. Returns [`CoreError::EmptyBuffer`] when no records
    /// are buffered. Nothing is cleared until encoding has succeeded, so a
    /// failed flush leaves the session intact for retry.
    pub fn flush(&mut self) -> Result<AggregatedMessage, CoreError> {
        if self.records.is_empty() {
            return Err(CoreError::EmptyBuffer);
        }

        let payload = AggregatedPayload {
            partition_key_table: self.table.keys().to_vec(),
            explicit_hash_key_table: Vec::new(),
            records: self
                .records
                .iter()
                .map(|record| WireRecord {
                    partition_key_index: Some(record.partition_key_index),
                    explicit_hash_key_index: None,
                    data: Some(record.data.to_vec()),
                    tags: Vec::new(),
                })
                .collect(),
        };
        let framed = wire::frame(&payload)?;

        let partition_key = self.representative_key.take().unwrap_or_default();
        self.clear();

        Ok(AggregatedMessage {
            data: Bytes::from(framed),
            partition_key,
        })
    }

    /// Projected framed size if the buffer were flushed as-is.
    fn estimated_size(&self) -> usize {
        self.accumulated_size + FRAMING_OVERHEAD
    }

    /// Reset the session to empty.
    fn clear(&mut self) {
        self.table.clear();
        self.representative_key = None;
        self.records.clear();
        self.accumulated_size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    /// Strip the framing and decode the body, verifying the digest.
    fn unframe(message: &AggregatedMessage) -> AggregatedPayload {
        assert!(message.is_aggregated());
        let body = &message.data[wire::MAGIC_NUMBER.len()..message.data.len() - wire::DIGEST_LEN];
        let digest = &message.data[message.data.len() - wire::DIGEST_LEN..];
        assert_eq!(digest, &wire::content_digest(body)[..]);
        AggregatedPayload::decode(body).unwrap()
    }

    #[test]
    fn test_scenario_a_buffering_and_dedup() {
        let mut agg = RecordAggregator::new();
        assert!(agg.add_record("k1", &[0xaa; 100]).unwrap().is_none());
        assert!(agg.add_record("k2", &[0xbb; 200]).unwrap().is_none());
        assert!(agg.add_record("k1", &[0xcc; 300]).unwrap().is_none());
        assert_eq!(agg.record_count(), 3);

        let message = agg.flush().unwrap();
        assert_eq!(message.partition_key, "k1");

        let payload = unframe(&message);
        assert_eq!(payload.partition_key_table, vec!["k1", "k2"]);
        let indices: Vec<u64> = payload
            .records
            .iter()
            .map(|r| r.partition_key_index.unwrap())
            .collect();
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_scenario_b_oversize_bypass() {
        let mut agg = RecordAggregator::new();
        let payload = vec![0x5a; 25_000];

        let message = agg.add_record("kx", &payload).unwrap().expect("bypass");
        assert_eq!(message.partition_key, "kx");
        assert_eq!(&message.data[..], &payload[..]);
        assert!(!message.is_aggregated());
        assert_eq!(agg.record_count(), 0);
    }

    #[test]
    fn test_bypass_at_exact_threshold() {
        let mut agg = RecordAggregator::new();
        let at_bound = vec![0u8; DEFAULT_MAX_RECORD_SIZE];
        assert!(agg.add_record("k", &at_bound).unwrap().is_some());
        assert_eq!(agg.record_count(), 0);

        let below = vec![0u8; DEFAULT_MAX_RECORD_SIZE - 1];
        assert!(agg.add_record("k", &below).unwrap().is_none());
        assert_eq!(agg.record_count(), 1);
    }

    #[test]
    fn test_scenario_c_preemptive_flush() {
        let mut agg = RecordAggregator::new();
        let payload = [0x11u8; 400];

        let mut added = 0usize;
        let message = loop {
            match agg.add_record("key", &payload).unwrap() {
                Some(message) => break message,
                None => added += 1,
            }
        };

        // The flushed aggregate holds every record admitted before the
        // triggering call; the triggering record sits alone in the buffer.
        let body = unframe(&message);
        assert_eq!(body.records.len(), added);
        assert_eq!(agg.record_count(), 1);
        assert_eq!(message.partition_key, "key");

        // Size bound: the framed output stays under the ceiling.
        assert!(message.data.len() < MAX_MESSAGE_SIZE);
    }

    #[test]
    fn test_flush_resets_state() {
        let mut agg = RecordAggregator::new();
        agg.add_record("k1", b"one").unwrap();
        agg.add_record("k2", b"two").unwrap();

        let first = agg.flush().unwrap();
        assert_eq!(first.partition_key, "k1");
        assert_eq!(agg.record_count(), 0);

        // Representative key and table restart with the next admission.
        agg.add_record("k9", b"three").unwrap();
        let second = agg.flush().unwrap();
        assert_eq!(second.partition_key, "k9");
        let body = unframe(&second);
        assert_eq!(body.partition_key_table, vec!["k9"]);
        assert_eq!(body.records[0].partition_key_index, Some(0));
    }

    #[test]
    fn test_flush_empty_buffer_is_error() {
        let mut agg = RecordAggregator::new();
        assert!(matches!(agg.flush(), Err(CoreError::EmptyBuffer)));

        // Still usable afterwards.
        agg.add_record("k", b"data").unwrap();
        assert_eq!(agg.record_count(), 1);
    }

    #[test]
    fn test_index_integrity_across_interleaved_keys() {
        let mut agg = RecordAggregator::new();
        let sequence = ["c", "a", "b", "a", "c", "d", "b"];
        for (i, key) in sequence.iter().enumerate() {
            agg.add_record(key, &[i as u8]).unwrap();
        }

        let body = unframe(&agg.flush().unwrap());
        assert_eq!(body.partition_key_table, vec!["c", "a", "b", "d"]);
        for (record, key) in body.records.iter().zip(sequence.iter()) {
            let idx = record.partition_key_index.unwrap() as usize;
            assert_eq!(&body.partition_key_table[idx], key);
        }
    }

    #[test]
    fn test_round_trip_preserves_payloads_in_order() {
        let mut agg = RecordAggregator::new();
        let inputs: Vec<(&str, Vec<u8>)> = vec![
            ("k1", b"first".to_vec()),
            ("k2", vec![0u8; 512]),
            ("k1", Vec::new()),
            ("k3", vec![0xff; 7]),
        ];
        for (key, data) in &inputs {
            agg.add_record(key, data).unwrap();
        }

        let body = unframe(&agg.flush().unwrap());
        assert_eq!(body.records.len(), inputs.len());
        for (record, (key, data)) in body.records.iter().zip(inputs.iter()) {
            assert_eq!(record.data.as_deref(), Some(data.as_slice()));
            let idx = record.partition_key_index.unwrap() as usize;
            assert_eq!(&body.partition_key_table[idx], key);
        }
    }

    #[test]
    fn test_dedup_counts_distinct_keys_only() {
        let mut agg = RecordAggregator::new();
        for key in ["k1", "k2", "k1", "k2", "k1"] {
            agg.add_record(key, b"payload").unwrap();
        }
        let body = unframe(&agg.flush().unwrap());
        assert_eq!(body.partition_key_table.len(), 2);
        assert_eq!(body.records.len(), 5);
    }

    #[test]
    fn test_small_ceiling_forces_flush() {
        let mut agg = RecordAggregator::with_config(AggregatorConfig {
            max_message_size: 512,
            ..AggregatorConfig::default()
        });

        // Each 100-byte record charges 108 bytes plus the key once; with 22
        // bytes of framing the projection crosses 512 on the fifth admission.
        assert!(agg.add_record("k", &[1u8; 100]).unwrap().is_none());
        assert!(agg.add_record("k", &[2u8; 100]).unwrap().is_none());
        assert!(agg.add_record("k", &[3u8; 100]).unwrap().is_none());
        assert!(agg.add_record("k", &[4u8; 100]).unwrap().is_none());
        let message = agg.add_record("k", &[5u8; 100]).unwrap().expect("flush");

        let body = unframe(&message);
        assert_eq!(body.records.len(), 4);
        assert_eq!(agg.record_count(), 1);
        assert!(message.data.len() < 512);
    }

    #[test]
    fn test_empty_payload_record_is_buffered() {
        let mut agg = RecordAggregator::new();
        assert!(agg.add_record("k", b"").unwrap().is_none());
        assert_eq!(agg.record_count(), 1);

        let body = unframe(&agg.flush().unwrap());
        assert_eq!(body.records[0].data.as_deref(), Some(&b""[..]));
    }
}
