//! The producer: aggregation buffer plus transport submission.
//!
//! A [`Producer`] owns one [`RecordAggregator`] and one transport. Records
//! fed through [`publish`](Producer::publish) are buffered until the
//! aggregator yields a message (oversize bypass or preemptive flush), which
//! is then submitted as a single-entry batch. At the end of a session
//! [`drain`](Producer::drain) flushes and submits the remainder.
//!
//! Retry-free by design: a rejected entry or transport error is returned to
//! the caller, never retried internally.

use serde::{Deserialize, Serialize};

use silo_core::{AggregatedMessage, AggregatorConfig, RecordAggregator};
use silo_transport::{EntryOutcome, StreamTransport};

use crate::error::{ProducerError, Result};

/// Configuration for a [`Producer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// The stream every submission is addressed to.
    pub stream_name: String,
    /// Aggregation thresholds.
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

impl ProducerConfig {
    /// Configuration for `stream_name` with default aggregation thresholds.
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            aggregator: AggregatorConfig::default(),
        }
    }
}

/// Summary of one successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Partition key the message was routed with.
    pub partition_key: String,
    /// Transport-assigned sequence number.
    pub sequence_number: String,
    /// Size of the submitted bytes.
    pub bytes_sent: usize,
    /// Whether the message was a framed aggregate (false for a bypassed
    /// record).
    pub aggregated: bool,
}

/// A session-scoped producer over a stream transport.
pub struct Producer<T: StreamTransport> {
    transport: T,
    aggregator: RecordAggregator,
    config: ProducerConfig,
}

impl<T: StreamTransport> Producer<T> {
    /// Create a producer over `transport`.
    pub fn new(transport: T, config: ProducerConfig) -> Self {
        let aggregator = RecordAggregator::with_config(config.aggregator.clone());
        Self {
            transport,
            aggregator,
            config,
        }
    }

    /// The stream submissions are addressed to.
    pub fn stream_name(&self) -> &str {
        &self.config.stream_name
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of records buffered and not yet submitted.
    pub fn buffered_records(&self) -> usize {
        self.aggregator.record_count()
    }

    /// Feed one record to the aggregator, submitting any message it yields.
    ///
    /// Returns `Ok(None)` when the record was buffered, `Ok(Some(delivery))`
    /// when a message (a flushed batch or a bypassed oversize record) was
    /// submitted and accepted.
    pub async fn publish(&mut self, partition_key: &str, payload: &[u8]) -> Result<Option<Delivery>> {
        match self.aggregator.add_record(partition_key, payload)? {
            Some(message) => self.submit(message).await.map(Some),
            None => Ok(None),
        }
    }

    /// Flush and submit any buffered remainder.
    ///
    /// Returns `Ok(None)` when the buffer was empty.
    pub async fn drain(&mut self) -> Result<Option<Delivery>> {
        if self.aggregator.record_count() == 0 {
            return Ok(None);
        }
        let message = self.aggregator.flush()?;
        self.submit(message).await.map(Some)
    }

    /// Submit one message as a single-entry batch.
    async fn submit(&self, message: AggregatedMessage) -> Result<Delivery> {
        let partition_key = message.partition_key.clone();
        let bytes_sent = message.data.len();
        let aggregated = message.is_aggregated();

        tracing::debug!(
            stream = %self.config.stream_name,
            partition_key = %partition_key,
            bytes = bytes_sent,
            aggregated,
            "submitting message"
        );

        let outcomes = self
            .transport
            .submit(&self.config.stream_name, vec![message.into()])
            .await?;

        match outcomes.into_iter().next() {
            Some(EntryOutcome::Accepted { sequence_number }) => Ok(Delivery {
                partition_key,
                sequence_number,
                bytes_sent,
                aggregated,
            }),
            Some(EntryOutcome::Rejected { code, message }) => {
                tracing::warn!(
                    stream = %self.config.stream_name,
                    partition_key = %partition_key,
                    code = %code,
                    "entry rejected"
                );
                Err(ProducerError::EntryRejected { code, message })
            }
            None => Err(ProducerError::MissingOutcome),
        }
    }
}
