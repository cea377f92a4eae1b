//! Protocol error types.

use thiserror::Error;

/// Errors from encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// A frame was not valid JSON or did not match any known message shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
