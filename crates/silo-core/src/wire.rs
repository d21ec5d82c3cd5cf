//! Binary wire format for aggregated messages.
//!
//! An aggregated message is framed as:
//!
//! ```text
//! [0:4]    magic number 0xF3 0x89 0x9A 0xC2
//! [4:N]    protobuf-encoded AggregatedPayload
//! [N:N+16] MD5 digest of bytes [4:N]
//! ```
//!
//! The framing is a fixed wire contract consumed by downstream
//! de-aggregating readers; it must be reproduced bit-for-bit. The middle
//! section follows a proto2 schema in which the required fields of each
//! record (`partition_key_index`, `data`) are always written, even at their
//! default values. With prost that means the fields are declared `optional`
//! and populated unconditionally.

use md5::{Digest, Md5};
use prost::Message;

/// Magic number prefix marking a framed aggregate.
pub const MAGIC_NUMBER: [u8; 4] = [0xF3, 0x89, 0x9A, 0xC2];

/// Length of the trailing content digest.
pub const DIGEST_LEN: usize = 16;

/// Fixed overhead the protobuf encoding adds beyond the summed field sizes.
pub const ENCODING_OVERHEAD: usize = 2;

/// Per-message framing cost charged once when estimating encoded size.
pub const FRAMING_OVERHEAD: usize = MAGIC_NUMBER.len() + DIGEST_LEN + ENCODING_OVERHEAD;

/// The serialized body of an aggregated message.
///
/// `partition_key_table` holds the deduplicated keys in assignment order;
/// each record refers back into it by index. The explicit-hash-key table and
/// per-record tags exist in the schema for compatibility with
/// schema-complete readers; this engine never populates them.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregatedPayload {
    #[prost(string, repeated, tag = "1")]
    pub partition_key_table: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub explicit_hash_key_table: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub records: Vec<WireRecord>,
}

/// One buffered record on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireRecord {
    /// Index into the partition-key table. Required in the schema: always
    /// written, even when 0.
    #[prost(uint64, optional, tag = "1")]
    pub partition_key_index: Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub explicit_hash_key_index: Option<u64>,
    /// Opaque record payload. Required in the schema: always written, even
    /// when empty.
    #[prost(bytes = "vec", optional, tag = "3")]
    pub data: Option<Vec<u8>>,
    #[prost(message, repeated, tag = "4")]
    pub tags: Vec<WireTag>,
}

/// Key/value tag attached to a record. Never written by this engine.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireTag {
    #[prost(string, optional, tag = "1")]
    pub key: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
}

/// Compute the 16-byte content digest of a serialized body.
///
/// This is an integrity check, not a security mechanism. MD5 is kept
/// because downstream readers recompute it over the same bytes.
pub fn content_digest(body: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Md5::new();
    hasher.update(body);
    hasher.finalize().into()
}

/// Serialize a payload and wrap it in magic number and digest.
pub fn frame(payload: &AggregatedPayload) -> Result<Vec<u8>, prost::EncodeError> {
    let body_len = payload.encoded_len();
    let mut framed = Vec::with_capacity(MAGIC_NUMBER.len() + body_len + DIGEST_LEN);
    framed.extend_from_slice(&MAGIC_NUMBER);
    payload.encode(&mut framed)?;
    let digest = content_digest(&framed[MAGIC_NUMBER.len()..]);
    framed.extend_from_slice(&digest);
    Ok(framed)
}

/// Whether `data` carries the aggregate framing.
pub fn is_framed(data: &[u8]) -> bool {
    data.len() >= MAGIC_NUMBER.len() + DIGEST_LEN && data.starts_with(&MAGIC_NUMBER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u64, data: &[u8]) -> WireRecord {
        WireRecord {
            partition_key_index: Some(index),
            explicit_hash_key_index: None,
            data: Some(data.to_vec()),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_required_fields_written_at_defaults() {
        // proto2 required semantics: index 0 and empty data still hit the wire.
        let mut buf = Vec::new();
        record(0, b"").encode(&mut buf).unwrap();
        assert_eq!(buf, vec![0x08, 0x00, 0x1a, 0x00]);
    }

    #[test]
    fn test_single_record_body_bytes() {
        let payload = AggregatedPayload {
            partition_key_table: vec!["k1".to_string()],
            explicit_hash_key_table: Vec::new(),
            records: vec![record(0, b"hello")],
        };
        let body = payload.encode_to_vec();
        assert_eq!(hex::encode(&body), "0a026b311a0908001a0568656c6c6f");
    }

    #[test]
    fn test_frame_layout() {
        let payload = AggregatedPayload {
            partition_key_table: vec!["k1".to_string()],
            explicit_hash_key_table: Vec::new(),
            records: vec![record(0, b"hello")],
        };
        let framed = frame(&payload).unwrap();

        assert!(framed.starts_with(&MAGIC_NUMBER));
        let body = &framed[MAGIC_NUMBER.len()..framed.len() - DIGEST_LEN];
        let digest = &framed[framed.len() - DIGEST_LEN..];
        assert_eq!(digest, &content_digest(body)[..]);
        assert_eq!(
            hex::encode(&framed),
            "f3899ac20a026b311a0908001a0568656c6c6fb6f9aa2060137139c31d806b8fd37732"
        );
    }

    #[test]
    fn test_digest_known_value() {
        let body = hex::decode("0a026b311a0908001a0568656c6c6f").unwrap();
        assert_eq!(
            hex::encode(content_digest(&body)),
            "b6f9aa2060137139c31d806b8fd37732"
        );
    }

    #[test]
    fn test_is_framed() {
        let payload = AggregatedPayload {
            partition_key_table: vec!["k".to_string()],
            explicit_hash_key_table: Vec::new(),
            records: vec![record(0, b"x")],
        };
        let framed = frame(&payload).unwrap();
        assert!(is_framed(&framed));

        // Raw payloads are not framed, even if long enough.
        assert!(!is_framed(&[0u8; 64]));
        // The magic alone is not enough without room for a digest.
        assert!(!is_framed(&MAGIC_NUMBER));
    }

    #[test]
    fn test_body_roundtrip() {
        let payload = AggregatedPayload {
            partition_key_table: vec!["k1".to_string(), "k2".to_string()],
            explicit_hash_key_table: Vec::new(),
            records: vec![record(0, b"alpha"), record(1, b"beta"), record(0, b"gamma")],
        };
        let body = payload.encode_to_vec();
        let decoded = AggregatedPayload::decode(body.as_slice()).unwrap();
        assert_eq!(decoded, payload);
    }
}
