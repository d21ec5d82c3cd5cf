//! # Silo Testkit
//!
//! Testing utilities for the silo aggregation engine.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: fixed input batches with their exact expected
//!   framed bytes, pinning the wire contract
//! - **Unpack**: test-only de-aggregation (frame split, digest check, body
//!   decode) so round-trip tests don't need a decode API on the engine
//! - **Generators**: proptest strategies for keys, payloads, and batches
//! - **Fixtures**: aggregator/transport setup helpers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use silo_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().expect("wire contract drifted");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use silo_testkit::generators::record_batch;
//!
//! proptest! {
//!     #[test]
//!     fn flushes_stay_bounded(batch in record_batch(64, 1024)) {
//!         // feed the batch through an aggregator ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod unpack;
pub mod vectors;

pub use fixtures::{fill_until_flush, patterned_payload, random_payload, TestFixture};
pub use unpack::{unpack, UnpackError, UnpackedAggregate, UnpackedRecord};
pub use vectors::{all_vectors, build_message, verify_all_vectors, verify_vector, GoldenVector};
