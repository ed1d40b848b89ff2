//! Length-prefixed frame codec.
//!
//! Frame layout: 4-byte big-endian body length, then the body. The body is a
//! JSON envelope `{"type": <tag>, "payload": ...}`. The length prefix makes
//! message boundaries unambiguous: a reader can pull exactly one message at a
//! time even when several arrive in one read or one spans multiple reads.

use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};
use crate::messages::{tag, ChecksumPayload, HandshakePayload, Message, SequencePayload};

/// Hard cap on the body length of a single frame.
///
/// Every protocol message is far smaller; a prefix above this limit means the
/// peer is broken or hostile, and decoding fails instead of allocating.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

const LEN_PREFIX: usize = 4;

/// The JSON body shared by all frames.
#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: u8,
    payload: serde_json::Value,
}

/// Encode a message into a complete frame (length prefix included).
pub fn encode(message: &Message) -> Result<Vec<u8>> {
    let payload = match message {
        Message::Handshake(p) => serde_json::to_value(p)?,
        Message::Sequence(p) => serde_json::to_value(p)?,
        Message::Error(text) => serde_json::Value::String(text.clone()),
        Message::Checksum(p) => serde_json::to_value(p)?,
    };
    let body = serde_json::to_vec(&Envelope {
        tag: message.tag(),
        payload,
    })?;
    if body.len() > MAX_FRAME_LEN {
        return Err(ProtoError::Malformed(format!(
            "outgoing frame of {} bytes exceeds limit",
            body.len()
        )));
    }

    let mut frame = Vec::with_capacity(LEN_PREFIX + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode one frame body into a typed message.
fn decode_body(body: &[u8]) -> Result<Message> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| ProtoError::Malformed(format!("invalid envelope: {e}")))?;

    match envelope.tag {
        tag::HANDSHAKE => {
            let payload: HandshakePayload = payload_as(envelope.payload, "handshake")?;
            Ok(Message::Handshake(payload))
        }
        tag::SEQUENCE => {
            let payload: SequencePayload = payload_as(envelope.payload, "sequence")?;
            Ok(Message::Sequence(payload))
        }
        tag::ERROR => {
            let text: String = payload_as(envelope.payload, "error")?;
            Ok(Message::Error(text))
        }
        tag::CHECKSUM => {
            let payload: ChecksumPayload = payload_as(envelope.payload, "checksum")?;
            Ok(Message::Checksum(payload))
        }
        other => Err(ProtoError::Malformed(format!(
            "unknown message tag: {other}"
        ))),
    }
}

fn payload_as<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    kind: &str,
) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ProtoError::Malformed(format!("invalid {kind} payload: {e}")))
}

/// Incremental decoder over a chunked byte stream.
///
/// Feed raw bytes with [`extend`](Self::extend) as they arrive; pop complete
/// messages with [`next_message`](Self::next_message). Bytes that do not yet
/// form a complete frame are buffered.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete message, or `None` if more bytes are needed.
    pub fn next_message(&mut self) -> Result<Option<Message>> {
        if self.buf.len() < LEN_PREFIX {
            return Ok(None);
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&self.buf[..LEN_PREFIX]);
        let len = u32::from_be_bytes(len_bytes) as usize;
        if len > MAX_FRAME_LEN {
            return Err(ProtoError::Malformed(format!(
                "frame length {len} exceeds limit"
            )));
        }
        if self.buf.len() < LEN_PREFIX + len {
            return Ok(None);
        }

        self.buf.advance(LEN_PREFIX);
        let body = self.buf.split_to(len);
        decode_body(&body).map(Some)
    }

    /// True when no partial frame is buffered.
    ///
    /// End-of-stream with a non-empty buffer means the peer died mid-frame.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use restream_core::ClientId;

    fn decode_all(frames: &[u8], chunk: usize) -> Vec<Message> {
        let mut decoder = FrameDecoder::new();
        let mut out = Vec::new();
        for piece in frames.chunks(chunk) {
            decoder.extend(piece);
            while let Some(msg) = decoder.next_message().unwrap() {
                out.push(msg);
            }
        }
        assert!(decoder.is_empty());
        out
    }

    #[test]
    fn test_handshake_round_trip() {
        let msg = Message::Handshake(HandshakePayload {
            client_id: ClientId::new("client-1"),
            resume: true,
            count: 0,
            offset: 17,
        });
        let frame = encode(&msg).unwrap();
        assert_eq!(decode_all(&frame, frame.len()), vec![msg]);
    }

    #[test]
    fn test_error_payload_is_a_bare_string() {
        let msg = Message::Error("go away".to_string());
        let frame = encode(&msg).unwrap();
        let body = String::from_utf8(frame[LEN_PREFIX..].to_vec()).unwrap();
        assert!(body.contains(r#""payload":"go away""#), "body: {body}");
        assert_eq!(decode_all(&frame, 1), vec![msg]);
    }

    #[test]
    fn test_unknown_tag_is_malformed() {
        let body = br#"{"type":9,"payload":null}"#;
        let mut frame = (body.len() as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(body);

        let mut decoder = FrameDecoder::new();
        decoder.extend(&frame);
        let err = decoder.next_message().unwrap_err();
        assert!(matches!(err, ProtoError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn test_payload_shape_mismatch_is_malformed() {
        // Checksum tag with a sequence-shaped payload.
        let body = br#"{"type":3,"payload":{"sequence":1,"index":0}}"#;
        let mut frame = (body.len() as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(body);

        let mut decoder = FrameDecoder::new();
        decoder.extend(&frame);
        let err = decoder.next_message().unwrap_err();
        assert!(matches!(err, ProtoError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn test_oversized_length_prefix_is_rejected() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&((MAX_FRAME_LEN as u32 + 1).to_be_bytes()));
        let err = decoder.next_message().unwrap_err();
        assert!(matches!(err, ProtoError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn test_partial_frame_waits_for_more_bytes() {
        let frame = encode(&Message::Error("x".to_string())).unwrap();
        let mut decoder = FrameDecoder::new();

        decoder.extend(&frame[..3]);
        assert!(decoder.next_message().unwrap().is_none());
        assert!(!decoder.is_empty());

        decoder.extend(&frame[3..]);
        assert!(decoder.next_message().unwrap().is_some());
        assert!(decoder.is_empty());
    }

    proptest! {
        // The decoder must yield the same messages no matter how the byte
        // stream is chunked: merged into one read or split at any boundary.
        #[test]
        fn prop_chunking_does_not_change_decoded_messages(
            values in prop::collection::vec(any::<i32>(), 0..16),
            chunk in 1usize..32,
        ) {
            let mut messages = vec![Message::Checksum(ChecksumPayload {
                checksum: "ab".repeat(32),
                count: values.len() as u32,
            })];
            for (index, value) in values.iter().enumerate() {
                messages.push(Message::Sequence(SequencePayload {
                    value: *value,
                    index: index as u32,
                }));
            }

            let mut stream = Vec::new();
            for msg in &messages {
                stream.extend_from_slice(&encode(msg).unwrap());
            }

            prop_assert_eq!(decode_all(&stream, chunk), messages);
        }
    }
}
