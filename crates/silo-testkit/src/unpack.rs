//! Test-only de-aggregation.
//!
//! The engine only encodes; round-trip tests need to look inside a framed
//! aggregate without putting a decode API on the engine itself. This module
//! splits the frame, verifies the digest, and decodes the body back into the
//! ordered key table and `(payload, index)` pairs.

use prost::Message;
use thiserror::Error;

use silo_core::wire::{content_digest, AggregatedPayload, DIGEST_LEN, MAGIC_NUMBER};

/// Failures while taking a framed aggregate apart.
#[derive(Debug, Error)]
pub enum UnpackError {
    /// Shorter than magic number plus digest.
    #[error("frame truncated: {0} bytes")]
    Truncated(usize),

    /// Does not start with the aggregate magic number.
    #[error("missing magic number prefix")]
    MissingMagic,

    /// Recomputed digest disagrees with the trailing digest.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    /// The body is not a valid serialized aggregate.
    #[error("body decode: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A record points outside the key table.
    #[error("record {record} references key index {index} outside the table")]
    DanglingIndex { record: usize, index: u64 },
}

/// One record recovered from an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedRecord {
    /// The opaque payload.
    pub data: Vec<u8>,
    /// Index into the partition-key table.
    pub partition_key_index: u64,
}

/// The contents of a framed aggregate, in original insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedAggregate {
    /// The key table in assignment order.
    pub partition_keys: Vec<String>,
    /// The records in insertion order.
    pub records: Vec<UnpackedRecord>,
}

impl UnpackedAggregate {
    /// Resolve the partition key a record was added under.
    pub fn key_for(&self, record: &UnpackedRecord) -> &str {
        &self.partition_keys[record.partition_key_index as usize]
    }
}

/// Split a framed aggregate, verify its digest, and decode its body.
pub fn unpack(data: &[u8]) -> Result<UnpackedAggregate, UnpackError> {
    if data.len() < MAGIC_NUMBER.len() + DIGEST_LEN {
        return Err(UnpackError::Truncated(data.len()));
    }
    if !data.starts_with(&MAGIC_NUMBER) {
        return Err(UnpackError::MissingMagic);
    }

    let body = &data[MAGIC_NUMBER.len()..data.len() - DIGEST_LEN];
    let trailing = &data[data.len() - DIGEST_LEN..];
    let recomputed = content_digest(body);
    if trailing != &recomputed[..] {
        return Err(UnpackError::DigestMismatch {
            expected: hex::encode(trailing),
            actual: hex::encode(recomputed),
        });
    }

    let payload = AggregatedPayload::decode(body)?;
    let table_len = payload.partition_key_table.len() as u64;

    let mut records = Vec::with_capacity(payload.records.len());
    for (i, record) in payload.records.into_iter().enumerate() {
        let index = record.partition_key_index.unwrap_or_default();
        if index >= table_len {
            return Err(UnpackError::DanglingIndex { record: i, index });
        }
        records.push(UnpackedRecord {
            data: record.data.unwrap_or_default(),
            partition_key_index: index,
        });
    }

    Ok(UnpackedAggregate {
        partition_keys: payload.partition_key_table,
        records,
    })
}
