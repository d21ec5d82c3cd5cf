//! # Silo Transport
//!
//! The submission seam between the aggregation engine and the outbound
//! stream service. The engine produces `(partition key, bytes)` messages;
//! this crate defines the trait a transport implements to carry them, plus
//! an in-memory implementation for tests.
//!
//! Transports report success or failure per entry. Nothing here retries:
//! retry policy belongs to the caller.

pub mod error;
pub mod transport;

pub use error::TransportError;
pub use transport::memory::MemoryTransport;
pub use transport::{EntryOutcome, StreamTransport, SubmissionEntry};
