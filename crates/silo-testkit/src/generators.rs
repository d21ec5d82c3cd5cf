//! Proptest generators for property-based testing.

use proptest::prelude::*;

/// Generate a partition key: short, non-empty identifier.
pub fn partition_key() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,64}"
}

/// Generate payload bytes up to `max_len`.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a batch of `(partition key, payload)` records.
///
/// Keys are drawn from a small pool so batches exercise deduplication, not
/// just table growth.
pub fn record_batch(
    max_records: usize,
    max_payload: usize,
) -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    let key_pool = prop::collection::vec(partition_key(), 1..=8);
    (key_pool, 1..=max_records).prop_flat_map(move |(keys, count)| {
        prop::collection::vec(
            (0..keys.len(), payload(max_payload))
                .prop_map(move |(i, data)| (keys[i].clone(), data)),
            count,
        )
    })
}
