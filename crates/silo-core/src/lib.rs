//! # Silo Core
//!
//! The record aggregation engine: many small application records are packed
//! into a single size-bounded, checksummed, magic-number-tagged aggregate so
//! the per-message cost of the transport is paid once per batch instead of
//! once per record.
//!
//! This crate contains no I/O, no networking, no async. It is pure
//! computation over byte payloads.
//!
//! ## Key Types
//!
//! - [`RecordAggregator`] - The mutable aggregation buffer
//! - [`AggregatorConfig`] - Size thresholds, fixed at construction
//! - [`AggregatedMessage`] - A framed aggregate (or bypassed record) ready
//!   for submission
//! - [`PartitionKeyTable`] - First-seen-order dedup table for partition keys
//!
//! ## Wire Format
//!
//! Aggregates are framed as magic number, protobuf body, and 16-byte MD5
//! digest. See the [`wire`] module for the exact layout; it is a fixed
//! contract consumed by downstream de-aggregating readers.

pub mod aggregator;
pub mod error;
pub mod table;
pub mod wire;

pub use aggregator::{
    AggregatedMessage, AggregatorConfig, RecordAggregator, DEFAULT_MAX_RECORD_SIZE,
    MAX_MESSAGE_SIZE, PARTITION_KEY_INDEX_OVERHEAD,
};
pub use error::CoreError;
pub use table::PartitionKeyTable;
pub use wire::{AggregatedPayload, WireRecord, WireTag, DIGEST_LEN, FRAMING_OVERHEAD, MAGIC_NUMBER};
