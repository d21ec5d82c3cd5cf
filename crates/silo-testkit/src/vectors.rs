//! Golden wire vectors for deterministic verification.
//!
//! These vectors pin the framed byte output of the aggregation engine so
//! that any change to the wire contract (magic number, body encoding,
//! digest) fails loudly. The expected bytes were produced against the
//! reference de-aggregation format and must never change.

use silo_core::{AggregatedMessage, CoreError, RecordAggregator};

/// A golden wire vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Records to add, as `(partition key, payload)` pairs in order.
    pub records: &'static [(&'static str, &'static [u8])],
    /// Expected representative key of the flushed aggregate.
    pub expected_partition_key: &'static str,
    /// Expected framed output, hex-encoded.
    pub expected_framed_hex: &'static str,
}

/// Get all golden wire vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "single record",
            records: &[("k1", b"hello")],
            expected_partition_key: "k1",
            expected_framed_hex:
                "f3899ac20a026b311a0908001a0568656c6c6fb6f9aa2060137139c31d806b8fd37732",
        },
        GoldenVector {
            name: "two keys, interleaved",
            records: &[("k1", b"alpha"), ("k2", b"beta"), ("k1", b"gamma")],
            expected_partition_key: "k1",
            expected_framed_hex:
                "f3899ac20a026b310a026b321a0908001a05616c7068611a0808011a04626574611a0908001a0567616d6d616d4915e7b2d47605f0290488dfb70fdb",
        },
        GoldenVector {
            name: "empty payload",
            records: &[("sensor-7", b"")],
            expected_partition_key: "sensor-7",
            expected_framed_hex:
                "f3899ac20a0873656e736f722d371a0408001a00660cbd5dcab2ca896fe6cd2b3082dac4",
        },
    ]
}

/// Run a vector's inputs through a fresh aggregator and flush.
pub fn build_message(vector: &GoldenVector) -> Result<AggregatedMessage, CoreError> {
    let mut aggregator = RecordAggregator::new();
    for (key, payload) in vector.records {
        // Golden payloads are all far below the bypass bound.
        let flushed = aggregator.add_record(key, payload)?;
        assert!(flushed.is_none(), "vector {} flushed early", vector.name);
    }
    aggregator.flush()
}

/// Verify one vector, returning a description of the mismatch if any.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let message = build_message(vector).map_err(|e| format!("{}: {e}", vector.name))?;
    if message.partition_key != vector.expected_partition_key {
        return Err(format!(
            "{}: partition key {} != {}",
            vector.name, message.partition_key, vector.expected_partition_key
        ));
    }
    let actual = hex::encode(&message.data);
    if actual != vector.expected_framed_hex {
        return Err(format!(
            "{}: framed bytes\n  actual   {actual}\n  expected {}",
            vector.name, vector.expected_framed_hex
        ));
    }
    Ok(())
}

/// Verify every golden vector.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        verify_vector(&vector)?;
    }
    Ok(())
}
