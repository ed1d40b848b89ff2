//! # Restream
//!
//! Resumable integer-sequence transfer over TCP.
//!
//! ## Overview
//!
//! A server assigns each client an immutable sequence of 32-bit integers and
//! announces a checksum over it; the client streams the sequence one item at
//! a time and, when the connection drops mid-stream, reconnects and resumes
//! from the exact point of failure instead of starting over. At the end the
//! client verifies the reassembled sequence against the original checksum.
//!
//! ## Key Concepts
//!
//! - **Session**: the server-retained record of one client's assigned
//!   sequence. Immutable once created; expires after a sliding TTL.
//! - **Handshake**: the first message on every connection, opening either a
//!   fresh session or a resume at an offset.
//! - **Watermark**: the highest sequence index the client has consumed; the
//!   resume offset is always `watermark + 1` (expressed as `values.len()`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use restream::client::{DriverConfig, SessionDriver};
//! use restream::server::{Server, ServerConfig};
//!
//! async fn example() -> anyhow::Result<()> {
//!     // Server side
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     tokio::spawn(server.serve());
//!
//!     // Client side
//!     let mut config = DriverConfig::new("127.0.0.1:7400");
//!     config.requested_count = 10;
//!     let driver = SessionDriver::new(config);
//!     let transfer = driver.run().await?;
//!     println!("verified {} values, checksum {}", transfer.values.len(), transfer.checksum);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! The component crates are re-exported for convenience:
//!
//! - [`core`] - Client identity and the checksum engine
//! - [`proto`] - Wire messages, frame codec, framed connection
//! - [`store`] - Session store trait and in-memory TTL implementation
//! - [`server`] - Listener and handshake state machine
//! - [`client`] - The session driver

pub use restream_client as client;
pub use restream_core as core;
pub use restream_proto as proto;
pub use restream_server as server;
pub use restream_store as store;

// Commonly used types at the crate root
pub use restream_client::{ClientError, DriverConfig, SessionDriver, Transfer};
pub use restream_core::{sequence_checksum, ClientId};
pub use restream_proto::{Connection, Message};
pub use restream_server::{Server, ServerConfig};
pub use restream_store::{MemorySessionStore, SessionStore};
