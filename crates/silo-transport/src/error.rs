//! Error types for the transport seam.

use thiserror::Error;

/// Errors that fail an entire submission call.
///
/// Per-entry failures are not errors at this level; they come back as
/// [`EntryOutcome::Rejected`](crate::EntryOutcome::Rejected) values.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The named stream does not exist on the transport.
    #[error("stream not found: {0}")]
    StreamNotFound(String),

    /// The transport is shut down and accepts no further submissions.
    #[error("transport closed")]
    Closed,

    /// The submission could not be delivered.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
}
