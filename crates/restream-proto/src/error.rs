//! Error types for the protocol module.

use thiserror::Error;

/// Errors that can occur while encoding, decoding, or exchanging messages.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Transport-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent something that is not a valid frame or message:
    /// unknown type tag, payload shape mismatch, or oversized frame.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The stream ended in the middle of a frame.
    ///
    /// Distinct from [`ProtoError::Malformed`]: a peer that dies mid-write
    /// produces this, and the client treats it as a recoverable drop rather
    /// than a protocol violation.
    #[error("connection closed mid-frame")]
    TruncatedFrame,

    /// Failed to serialize an outgoing message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtoError>;
