//! # Silo
//!
//! Record aggregation for high-throughput event-streaming producers: many
//! small application records are packed into a single size-bounded,
//! checksummed aggregate per outbound message, amortizing the transport's
//! fixed per-message cost.
//!
//! ## Overview
//!
//! - **Aggregation** ([`silo_core`]): the buffer, the partition-key dedup
//!   table, and the fixed binary wire format (magic number, protobuf body,
//!   16-byte digest).
//! - **Transport** ([`silo_transport`]): the submission seam; any
//!   PutRecords-style service fits behind [`StreamTransport`].
//! - **Producer** (this crate): drives the add/submit loop and drains the
//!   remainder at session end.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use silo::{Producer, ProducerConfig};
//! use silo_transport::MemoryTransport;
//!
//! async fn example() {
//!     let transport = MemoryTransport::new();
//!     let mut producer = Producer::new(transport, ProducerConfig::new("events"));
//!
//!     for i in 0..10_000u32 {
//!         let payload = format!("{{\"seq\": {i}}}");
//!         // Buffered until the aggregate fills; submitted automatically.
//!         producer.publish("sensor-7", payload.as_bytes()).await.unwrap();
//!     }
//!
//!     // Submit whatever is left in the buffer.
//!     producer.drain().await.unwrap();
//! }
//! ```

pub mod error;
pub mod producer;

// Re-export component crates
pub use silo_core as core;
pub use silo_transport as transport;

// Re-export main types for convenience
pub use error::{ProducerError, Result};
pub use producer::{Delivery, Producer, ProducerConfig};

// Re-export commonly used component types
pub use silo_core::{AggregatedMessage, AggregatorConfig, CoreError, RecordAggregator};
pub use silo_transport::{EntryOutcome, StreamTransport, SubmissionEntry, TransportError};
