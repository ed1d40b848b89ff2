//! Error types for the server.

use thiserror::Error;

/// Errors that can occur while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listen address.
    #[error("bind failed: {0}")]
    Bind(std::io::Error),

    /// Protocol error on a connection.
    #[error("protocol error: {0}")]
    Proto(#[from] restream_proto::ProtoError),

    /// Session store failure.
    #[error("store error: {0}")]
    Store(#[from] restream_store::StoreError),

    /// The first message on a connection was not a handshake.
    #[error("expected handshake, got message tag {0}")]
    UnexpectedMessage(u8),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
