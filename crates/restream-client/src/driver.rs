//! The session driver: connect, handshake, consume, resume.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use restream_core::{sequence_checksum, ClientId};
use restream_proto::messages::reply;
use restream_proto::{ChecksumPayload, Connection, HandshakePayload, Message, ProtoError};

use crate::backoff::{Backoff, RetryConfig};
use crate::error::{ClientError, Result};

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Server address, `host:port`.
    pub server_addr: String,

    /// Desired sequence length for the fresh handshake (0 = server chooses).
    pub requested_count: u32,

    /// Timeout applied to each individual connect attempt.
    pub connect_timeout: Duration,

    /// Backoff schedule for progress-free cycles: failed connects and
    /// connections that drop before delivering anything. The budget resets
    /// whenever a sequence item arrives.
    pub retry: RetryConfig,
}

impl DriverConfig {
    /// Configuration with defaults for everything but the address.
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            requested_count: 0,
            connect_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

/// Validated handshake parameters.
///
/// An explicit value instead of a chain of mutating option callbacks: the
/// two constructors make the invalid combinations (a resume without an
/// offset, a fresh handshake carrying one) unrepresentable.
#[derive(Debug, Clone, Copy)]
struct HandshakeOptions {
    resume: bool,
    offset: u32,
    count: u32,
}

impl HandshakeOptions {
    fn fresh(count: u32) -> Self {
        Self {
            resume: false,
            offset: 0,
            count,
        }
    }

    fn resume_at(offset: u32) -> Self {
        Self {
            resume: true,
            offset,
            count: 0,
        }
    }

    fn into_payload(self, client_id: &ClientId) -> HandshakePayload {
        HandshakePayload {
            client_id: client_id.clone(),
            resume: self.resume,
            count: self.count,
            offset: self.offset,
        }
    }
}

/// The outcome of a completed, verified run.
#[derive(Debug)]
pub struct Transfer {
    /// The full collected sequence, in index order.
    pub values: Vec<i32>,
    /// The verified checksum (equal to the server's announcement).
    pub checksum: String,
    /// How many transport drops were recovered along the way.
    pub reconnects: u32,
}

/// Drives one logical transfer across any number of connections.
pub struct SessionDriver {
    config: DriverConfig,
    client_id: ClientId,
}

impl SessionDriver {
    /// Create a driver with a freshly generated random identity.
    pub fn new(config: DriverConfig) -> Self {
        Self::with_client_id(config, ClientId::random())
    }

    /// Create a driver with a caller-chosen identity.
    pub fn with_client_id(config: DriverConfig, client_id: ClientId) -> Self {
        Self { config, client_id }
    }

    /// The identity this driver presents on every handshake.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Run the transfer to completion.
    ///
    /// Blocks until the full sequence has been collected and verified, or a
    /// terminal error occurs. Mid-stream transport drops are recovered
    /// internally by reconnecting and resuming at the watermark.
    pub async fn run(&self) -> Result<Transfer> {
        let mut reconnects = 0u32;
        let (mut conn, oracle) = self.establish(&mut reconnects).await?;
        tracing::debug!(
            client = %self.client_id,
            count = oracle.count,
            checksum = %oracle.checksum,
            "session established"
        );

        let mut values: Vec<i32> = Vec::with_capacity(oracle.count as usize);
        // Budget for progress-free reconnect cycles. Receiving an item resets
        // it; a peer that keeps dropping without delivering anything runs it
        // out instead of being retried forever with no delay.
        let mut backoff = Backoff::new(self.config.retry.clone());
        // Exactly `count` items, indices 0..count-1, no duplicates, no gaps:
        // the index check below enforces the shape, this condition the count.
        while (values.len() as u32) < oracle.count {
            match conn.recv().await {
                Ok(Some(Message::Sequence(item))) => {
                    let expected = values.len() as u32;
                    if item.index != expected {
                        return Err(ClientError::OutOfOrder {
                            expected,
                            got: item.index,
                        });
                    }
                    values.push(item.value);
                    if backoff.attempts() > 0 {
                        backoff = Backoff::new(self.config.retry.clone());
                    }
                }
                Ok(Some(Message::Error(message))) => return Err(classify_rejection(message)),
                Ok(Some(other)) => {
                    return Err(ClientError::Proto(ProtoError::Malformed(format!(
                        "unexpected message tag {} while streaming",
                        other.tag()
                    ))))
                }
                Ok(None) => {
                    reconnects += 1;
                    tracing::debug!(
                        watermark = values.len(),
                        reconnects,
                        "transport dropped, resuming"
                    );
                    self.pause(&mut backoff).await?;
                    conn = self.reconnect(values.len() as u32, &mut backoff).await?;
                }
                Err(ref e) if is_transport_drop(e) => {
                    reconnects += 1;
                    tracing::debug!(
                        watermark = values.len(),
                        reconnects,
                        "transport error, resuming: {e}"
                    );
                    self.pause(&mut backoff).await?;
                    conn = self.reconnect(values.len() as u32, &mut backoff).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let computed = sequence_checksum(&values);
        if computed != oracle.checksum {
            return Err(ClientError::ChecksumMismatch {
                server: oracle.checksum,
                computed,
            });
        }
        Ok(Transfer {
            values,
            checksum: computed,
            reconnects,
        })
    }

    /// Open the session: connect and perform the fresh handshake.
    ///
    /// A drop before the checksum reply arrives starts over with another
    /// fresh handshake; no items have been consumed yet and the server
    /// simply overwrites the session. Every progress-free cycle, whether a
    /// failed connect or a drop after one, draws on the same backoff budget.
    async fn establish(&self, reconnects: &mut u32) -> Result<(Connection, ChecksumPayload)> {
        let mut backoff = Backoff::new(self.config.retry.clone());
        loop {
            let mut conn = self.connect_with_retry(&mut backoff).await?;
            let payload =
                HandshakeOptions::fresh(self.config.requested_count).into_payload(&self.client_id);
            if let Err(e) = conn.send(&Message::Handshake(payload)).await {
                if is_transport_drop(&e) {
                    *reconnects += 1;
                    self.pause(&mut backoff).await?;
                    continue;
                }
                return Err(e.into());
            }

            match conn.recv().await {
                Ok(Some(Message::Checksum(oracle))) => return Ok((conn, oracle)),
                Ok(Some(Message::Error(message))) => return Err(classify_rejection(message)),
                Ok(Some(other)) => {
                    return Err(ClientError::Proto(ProtoError::Malformed(format!(
                        "expected checksum reply, got message tag {}",
                        other.tag()
                    ))))
                }
                Ok(None) => {
                    *reconnects += 1;
                    self.pause(&mut backoff).await?;
                }
                Err(ref e) if is_transport_drop(e) => {
                    *reconnects += 1;
                    self.pause(&mut backoff).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reconnect after a mid-stream drop and re-handshake at `offset`.
    ///
    /// No checksum reply follows a resume; the original oracle stands. The
    /// caller's backoff is shared so repeated drops stay bounded.
    async fn reconnect(&self, offset: u32, backoff: &mut Backoff) -> Result<Connection> {
        loop {
            let mut conn = self.connect_with_retry(backoff).await?;
            let payload = HandshakeOptions::resume_at(offset).into_payload(&self.client_id);
            match conn.send(&Message::Handshake(payload)).await {
                Ok(()) => return Ok(conn),
                Err(ref e) if is_transport_drop(e) => {
                    tracing::debug!("dropped during resume handshake, reconnecting: {e}");
                    self.pause(backoff).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Draw one attempt from the shared budget and sleep its delay, or fail
    /// with [`ClientError::ConnectionFailed`] once the budget is spent.
    async fn pause(&self, backoff: &mut Backoff) -> Result<()> {
        match backoff.next_delay() {
            Some(delay) => {
                sleep(delay).await;
                Ok(())
            }
            None => Err(ClientError::ConnectionFailed {
                attempts: backoff.attempts(),
                last: "connection kept dropping before any progress".to_string(),
            }),
        }
    }

    /// Attempt connection with exponential backoff between attempts; each
    /// attempt has its own timeout and draws on the caller's budget.
    async fn connect_with_retry(&self, backoff: &mut Backoff) -> Result<Connection> {
        loop {
            let attempt = timeout(
                self.config.connect_timeout,
                TcpStream::connect(&self.config.server_addr),
            )
            .await;

            let last = match attempt {
                Ok(Ok(stream)) => return Ok(Connection::new(stream)),
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!(
                    "connect timed out after {:?}",
                    self.config.connect_timeout
                ),
            };

            match backoff.next_delay() {
                Some(delay) => {
                    tracing::debug!(
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "connect failed: {last}"
                    );
                    sleep(delay).await;
                }
                None => {
                    return Err(ClientError::ConnectionFailed {
                        attempts: backoff.attempts(),
                        last,
                    })
                }
            }
        }
    }
}

fn is_transport_drop(e: &ProtoError) -> bool {
    matches!(e, ProtoError::Io(_) | ProtoError::TruncatedFrame)
}

/// Map a server error reply onto the client error taxonomy.
fn classify_rejection(message: String) -> ClientError {
    match message.as_str() {
        reply::SESSION_NOT_FOUND => ClientError::SessionNotFound,
        reply::OFFSET_OUT_OF_RANGE => ClientError::OffsetOutOfRange,
        _ => ClientError::Rejected(message),
    }
}
