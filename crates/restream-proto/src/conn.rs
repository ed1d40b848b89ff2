//! Framed connection over a TCP stream.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::codec::{encode, FrameDecoder};
use crate::error::{ProtoError, Result};
use crate::messages::Message;

const READ_CHUNK: usize = 4096;

/// A bidirectional, ordered message channel over one TCP connection.
///
/// Wraps a [`TcpStream`] with the frame codec so callers exchange whole
/// [`Message`]s. End-of-stream is reported distinctly from read errors:
/// [`recv`](Self::recv) returns `Ok(None)` when the peer closes cleanly at a
/// frame boundary.
pub struct Connection {
    stream: TcpStream,
    decoder: FrameDecoder,
}

impl Connection {
    /// Wrap an established stream.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(),
        }
    }

    /// Connect to a remote address.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// The remote peer's address.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Send one message as a single frame.
    pub async fn send(&mut self, message: &Message) -> Result<()> {
        let frame = encode(message)?;
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    /// Receive the next message.
    ///
    /// Returns `Ok(None)` when the peer closed the stream at a frame
    /// boundary, [`ProtoError::TruncatedFrame`] when it closed mid-frame.
    pub async fn recv(&mut self) -> Result<Option<Message>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(message) = self.decoder.next_message()? {
                return Ok(Some(message));
            }

            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                if self.decoder.is_empty() {
                    return Ok(None);
                }
                return Err(ProtoError::TruncatedFrame);
            }
            self.decoder.extend(&chunk[..n]);
        }
    }

    /// Close the write half, signalling end-of-stream to the peer.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
