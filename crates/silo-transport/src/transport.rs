//! Transport abstraction for outbound message submission.
//!
//! The transport accepts a stream identifier and a batch of
//! `(partition key, bytes)` entries, and reports success or failure per
//! entry. Implementations may wrap any PutRecords-style service; the
//! aggregation engine only ever supplies single-entry batches.

use async_trait::async_trait;

use bytes::Bytes;
use silo_core::AggregatedMessage;

use crate::error::TransportError;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// One `(partition key, bytes)` pair submitted to a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEntry {
    /// Routing key the transport shards on.
    pub partition_key: String,
    /// Opaque bytes: a framed aggregate or a bypassed record.
    pub data: Bytes,
}

impl From<AggregatedMessage> for SubmissionEntry {
    fn from(message: AggregatedMessage) -> Self {
        Self {
            partition_key: message.partition_key,
            data: message.data,
        }
    }
}

/// Per-entry result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The entry was accepted and sequenced by the transport.
    Accepted {
        /// Transport-assigned position within the shard.
        sequence_number: String,
    },
    /// The entry was rejected; the batch as a whole may still have been
    /// delivered.
    Rejected {
        /// Transport error code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

impl EntryOutcome {
    /// Whether the entry was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, EntryOutcome::Accepted { .. })
    }
}

/// Transport trait for submitting entries to a named stream.
///
/// Implementations must be thread-safe (Send + Sync). The transport owns
/// all I/O, timeouts, and throttling policy; callers own retry policy.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Submit a batch of entries to `stream`.
    ///
    /// Returns one outcome per entry, in entry order.
    async fn submit(&self, stream: &str, entries: Vec<SubmissionEntry>)
        -> Result<Vec<EntryOutcome>>;
}

/// A simple in-memory transport for testing.
///
/// Records every submitted entry and supports one-shot failure injection.
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::RwLock;

    /// In-memory [`StreamTransport`] implementation.
    pub struct MemoryTransport {
        /// Everything submitted so far, as `(stream, entry)` pairs.
        received: RwLock<Vec<(String, SubmissionEntry)>>,
        /// Injected rejection applied to the next submitted entry.
        reject_next: RwLock<Option<(String, String)>>,
        /// Monotonic sequence number source.
        next_sequence: AtomicU64,
    }

    impl MemoryTransport {
        /// Create an empty transport.
        pub fn new() -> Self {
            Self {
                received: RwLock::new(Vec::new()),
                reject_next: RwLock::new(None),
                next_sequence: AtomicU64::new(1),
            }
        }

        /// Reject the next submitted entry with the given code and message.
        pub async fn reject_next(&self, code: &str, message: &str) {
            *self.reject_next.write().await = Some((code.to_string(), message.to_string()));
        }

        /// Snapshot of all recorded submissions.
        pub async fn submissions(&self) -> Vec<(String, SubmissionEntry)> {
            self.received.read().await.clone()
        }

        /// Number of recorded submissions.
        pub async fn submission_count(&self) -> usize {
            self.received.read().await.len()
        }
    }

    impl Default for MemoryTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl StreamTransport for MemoryTransport {
        async fn submit(
            &self,
            stream: &str,
            entries: Vec<SubmissionEntry>,
        ) -> Result<Vec<EntryOutcome>> {
            let mut outcomes = Vec::with_capacity(entries.len());
            for entry in entries {
                if let Some((code, message)) = self.reject_next.write().await.take() {
                    outcomes.push(EntryOutcome::Rejected { code, message });
                    continue;
                }
                let seq = self.next_sequence.fetch_add(1, Ordering::Relaxed);
                self.received
                    .write()
                    .await
                    .push((stream.to_string(), entry));
                outcomes.push(EntryOutcome::Accepted {
                    sequence_number: seq.to_string(),
                });
            }
            Ok(outcomes)
        }
    }
}
