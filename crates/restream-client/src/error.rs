//! Error types for the client.

use thiserror::Error;

/// Errors surfaced to the caller of the session driver.
///
/// Transport drops are not here: the driver recovers them internally and
/// they are invisible to the caller when recovery succeeds.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not be established within the retry budget.
    /// Fatal; the driver does not retry further.
    #[error("connection failed after {attempts} attempts: {last}")]
    ConnectionFailed { attempts: u32, last: String },

    /// Protocol failure: malformed frame, unexpected message, or an I/O
    /// error outside the recoverable read path.
    #[error("protocol error: {0}")]
    Proto(#[from] restream_proto::ProtoError),

    /// The server has no live session for this identity. The logical run
    /// must be started over.
    #[error("no session to resume, start a new run")]
    SessionNotFound,

    /// The resume offset lies beyond the stored sequence. The session is
    /// unresumable; the logical run must be started over.
    #[error("resume offset out of range, start a new run")]
    OffsetOutOfRange,

    /// Any other server rejection (for example an oversized count request).
    #[error("server rejected the request: {0}")]
    Rejected(String),

    /// A sequence item arrived out of order, so the collected sequence
    /// would have a gap or a duplicate.
    #[error("sequence item out of order: expected index {expected}, got {got}")]
    OutOfOrder { expected: u32, got: u32 },

    /// The collected sequence does not checksum to the server's value.
    #[error("checksum mismatch: server announced {server}, computed {computed}")]
    ChecksumMismatch { server: String, computed: String },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
