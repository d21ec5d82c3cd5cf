//! Error types for the silo core.

use thiserror::Error;

/// Core errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The serializer could not encode the buffered records.
    ///
    /// The buffer is left untouched when this is returned, so the caller
    /// may retry the same flush or abandon the batch.
    #[error("encoding failure: {0}")]
    EncodingFailure(#[from] prost::EncodeError),

    /// A flush was requested on a buffer with no records.
    #[error("aggregation buffer is empty")]
    EmptyBuffer,
}
