//! Handshake interpretation and sequence streaming for one connection.
//!
//! The handshake is interpreted in two steps: [`SessionHandler::negotiate`]
//! turns a request plus the store's answer into an explicit [`Negotiation`]
//! decision, and [`SessionHandler::run`] drives the wire exchange that the
//! decision calls for. Keeping the decision separate from the I/O makes the
//! state machine testable without a socket.

use std::sync::Arc;

use tokio::net::TcpStream;

use restream_proto::messages::reply;
use restream_proto::{ChecksumPayload, Connection, HandshakePayload, Message, SequencePayload};
use restream_store::SessionStore;

use crate::error::{Result, ServerError};
use crate::server::ServerConfig;

/// Decision reached for one handshake request.
#[derive(Debug)]
pub(crate) enum Negotiation {
    /// New session: send the checksum reply, then stream from offset 0.
    Fresh {
        sequence: Arc<Vec<i32>>,
        checksum: String,
    },
    /// Existing session: no checksum reply, stream from `offset`.
    Resume {
        sequence: Arc<Vec<i32>>,
        offset: usize,
    },
    /// Reject with an error reply and close.
    Reject { message: String },
}

/// Per-connection handler. Holds the shared store and the server config;
/// owns no connection state between calls.
pub(crate) struct SessionHandler<S> {
    store: Arc<S>,
    config: ServerConfig,
}

impl<S: SessionStore> SessionHandler<S> {
    pub(crate) fn new(store: Arc<S>, config: ServerConfig) -> Self {
        Self { store, config }
    }

    /// Drive one connection from handshake to completion.
    pub(crate) async fn run(self, stream: TcpStream) -> Result<()> {
        let mut conn = Connection::new(stream);

        let request = match conn.recv().await? {
            Some(Message::Handshake(payload)) => payload,
            Some(other) => return Err(ServerError::UnexpectedMessage(other.tag())),
            // Peer connected and left without a word.
            None => return Ok(()),
        };

        tracing::debug!(
            client = %request.client_id,
            resume = request.resume,
            count = request.count,
            offset = request.offset,
            "handshake received"
        );

        match self.negotiate(&request).await? {
            Negotiation::Reject { message } => {
                tracing::debug!(client = %request.client_id, "rejecting: {message}");
                conn.send(&Message::Error(message)).await?;
                Ok(())
            }
            Negotiation::Fresh { sequence, checksum } => {
                conn.send(&Message::Checksum(ChecksumPayload {
                    checksum,
                    count: sequence.len() as u32,
                }))
                .await?;
                self.stream_items(&mut conn, &sequence, 0).await
            }
            Negotiation::Resume { sequence, offset } => {
                self.stream_items(&mut conn, &sequence, offset).await
            }
        }
    }

    /// Decide between fresh assignment, resume, and rejection.
    pub(crate) async fn negotiate(&self, request: &HandshakePayload) -> Result<Negotiation> {
        if request.resume {
            return self.negotiate_resume(request).await;
        }

        if request.count > self.config.max_count {
            // No session is created for an oversized request.
            return Ok(Negotiation::Reject {
                message: format!("{}: {}", reply::COUNT_TOO_LARGE, request.count),
            });
        }

        let count = if request.count == 0 {
            if self.config.max_count == 0 {
                // A zero ceiling leaves no assignable length.
                return Ok(Negotiation::Reject {
                    message: format!("{}: {}", reply::COUNT_TOO_LARGE, request.count),
                });
            }
            // Server's choice must be strictly positive and within the ceiling.
            use rand::Rng;
            rand::thread_rng().gen_range(1..self.config.max_count.max(2))
        } else {
            request.count
        };

        let sequence = Arc::new(generate_sequence(count));
        let checksum = restream_core::sequence_checksum(&sequence);
        self.store
            .put(&request.client_id, Arc::clone(&sequence))
            .await?;

        tracing::debug!(client = %request.client_id, count, "fresh session assigned");
        Ok(Negotiation::Fresh { sequence, checksum })
    }

    async fn negotiate_resume(&self, request: &HandshakePayload) -> Result<Negotiation> {
        // `count` is ignored on resume; the stored session is authoritative.
        match self.store.get(&request.client_id).await? {
            None => Ok(Negotiation::Reject {
                message: reply::SESSION_NOT_FOUND.to_string(),
            }),
            Some(sequence) => {
                let offset = request.offset as usize;
                // offset == len is valid: the replay is empty.
                if offset > sequence.len() {
                    return Ok(Negotiation::Reject {
                        message: reply::OFFSET_OUT_OF_RANGE.to_string(),
                    });
                }
                Ok(Negotiation::Resume { sequence, offset })
            }
        }
    }

    /// Emit one item per remaining element, in increasing absolute index
    /// order, starting at `offset`.
    async fn stream_items(
        &self,
        conn: &mut Connection,
        sequence: &[i32],
        offset: usize,
    ) -> Result<()> {
        for (index, value) in sequence.iter().enumerate().skip(offset) {
            conn.send(&Message::Sequence(SequencePayload {
                value: *value,
                index: index as u32,
            }))
            .await?;
        }
        tracing::debug!(
            sent = sequence.len() - offset,
            offset,
            "sequence streamed"
        );
        Ok(())
    }
}

/// Generate a sequence of server-chosen 32-bit integers.
///
/// The generation policy is opaque to the protocol; only the length and the
/// determinism of the checksum over the result matter to clients.
fn generate_sequence(count: u32) -> Vec<i32> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}
