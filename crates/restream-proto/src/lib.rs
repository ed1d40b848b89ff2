//! # Restream Proto
//!
//! The wire protocol for resumable sequence transfer: message types, the
//! length-prefixed frame codec, and a framed [`Connection`] over TCP.
//!
//! ## Framing
//!
//! TCP is a byte stream; one `read` may carry several logical messages or a
//! fraction of one. Every message is therefore sent as a self-delimiting
//! frame: a 4-byte big-endian length prefix followed by that many bytes of
//! JSON. The [`FrameDecoder`] reassembles frames from arbitrarily chunked
//! input and yields exactly one [`Message`] at a time.
//!
//! ## Message Flow
//!
//! ```text
//! Client                               Server
//!   |-------- Handshake (fresh) ------->|
//!   |<------- Checksum -----------------|
//!   |<------- Sequence(0) --------------|
//!   |<------- Sequence(1) --------------|
//!   |            ...  connection drops  |
//!   |-------- Handshake (resume@2) ---->|
//!   |<------- Sequence(2) --------------|
//!   |<------- ... ----------------------|
//! ```

pub mod codec;
pub mod conn;
pub mod error;
pub mod messages;

pub use codec::{FrameDecoder, MAX_FRAME_LEN};
pub use conn::Connection;
pub use error::{ProtoError, Result};
pub use messages::{ChecksumPayload, HandshakePayload, Message, SequencePayload};
