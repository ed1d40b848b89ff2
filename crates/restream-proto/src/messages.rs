//! Wire message types.
//!
//! Four message kinds travel over the wire, discriminated by an explicit
//! integer tag carried in every frame (see [`tag`]). Field names on the wire
//! use the protocol's JSON vocabulary (`uuid`, `continue`, `numberOfMessages`,
//! ...); the Rust structs use idiomatic names and map via serde renames.

use serde::{Deserialize, Serialize};

use restream_core::ClientId;

/// Message type tags. One of these appears in every frame envelope.
pub mod tag {
    /// Client handshake (fresh or resume).
    pub const HANDSHAKE: u8 = 0;
    /// One element of the assigned sequence.
    pub const SEQUENCE: u8 = 1;
    /// Terminal error reply.
    pub const ERROR: u8 = 2;
    /// Integrity oracle for a fresh session.
    pub const CHECKSUM: u8 = 3;
}

/// Error reply strings defined by the protocol.
///
/// The server sends these verbatim; the client classifies error replies by
/// matching against them.
pub mod reply {
    /// Resume requested but no live session exists for the identity.
    pub const SESSION_NOT_FOUND: &str = "Can't continue progress, please start over";
    /// Resume offset lies beyond the stored sequence.
    pub const OFFSET_OUT_OF_RANGE: &str = "Offset is out of range, Please start over";
    /// Prefix of the rejection sent for an oversized fresh request; the
    /// server appends `: <count>`.
    pub const COUNT_TOO_LARGE: &str = "Number of messages is too big";
}

/// A client handshake, opening either a fresh or a resumed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// Stable identity of the logical client.
    #[serde(rename = "uuid")]
    pub client_id: ClientId,

    /// `false`: assign a new sequence. `true`: resume the existing session.
    #[serde(rename = "continue")]
    pub resume: bool,

    /// Requested sequence length for a fresh session (0 = server chooses).
    /// Ignored on resume; the stored session is authoritative.
    #[serde(rename = "numberOfMessages")]
    pub count: u32,

    /// Zero-based index to resume streaming from. Only meaningful on resume.
    pub offset: u32,
}

/// The integrity oracle, sent once per fresh session before streaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumPayload {
    /// Checksum over the full assigned sequence.
    pub checksum: String,

    /// Length of the assigned sequence.
    #[serde(rename = "numberOfMessages")]
    pub count: u32,
}

/// One element of the assigned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePayload {
    /// The value at this position.
    #[serde(rename = "sequence")]
    pub value: i32,

    /// Absolute position in the full sequence, not relative to any resume
    /// point, so the client can track progress across reconnects.
    pub index: u32,
}

/// A decoded wire message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Client -> server session negotiation.
    Handshake(HandshakePayload),
    /// Server -> client sequence element.
    Sequence(SequencePayload),
    /// Server -> client terminal error for this connection.
    Error(String),
    /// Server -> client integrity oracle.
    Checksum(ChecksumPayload),
}

impl Message {
    /// The integer type tag this message carries on the wire.
    pub fn tag(&self) -> u8 {
        match self {
            Message::Handshake(_) => tag::HANDSHAKE,
            Message::Sequence(_) => tag::SEQUENCE,
            Message::Error(_) => tag::ERROR,
            Message::Checksum(_) => tag::CHECKSUM,
        }
    }
}
