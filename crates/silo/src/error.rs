//! Error types for the producer facade.

use silo_core::CoreError;
use silo_transport::TransportError;
use thiserror::Error;

/// Errors that can occur while publishing through a [`Producer`].
///
/// [`Producer`]: crate::Producer
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Aggregation error.
    #[error("aggregation error: {0}")]
    Core(#[from] CoreError),

    /// Transport error failing the whole submission.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The transport rejected the submitted entry. Not retried.
    #[error("entry rejected by transport: {code}: {message}")]
    EntryRejected {
        /// Transport error code.
        code: String,
        /// Human-readable description.
        message: String,
    },

    /// The transport returned no outcome for the submitted entry.
    #[error("transport returned no outcome for submitted entry")]
    MissingOutcome,
}

/// Result type for producer operations.
pub type Result<T> = std::result::Result<T, ProducerError>;
