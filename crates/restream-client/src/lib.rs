//! # Restream Client
//!
//! The session driver: connects to a restream server, pulls an integer
//! sequence, and resumes transparently when the transport drops mid-stream.
//!
//! ## Resumption
//!
//! The driver keeps one stable [`ClientId`] for its whole life. On a fresh
//! handshake it retains the server's checksum reply; when the connection
//! drops it reconnects (bounded attempts, exponential backoff), re-handshakes
//! with `continue = true` at the current watermark, and keeps reading. A
//! successful run always yields exactly the announced number of items with
//! gap-free indices, verified against the retained checksum.
//!
//! [`ClientId`]: restream_core::ClientId

pub mod backoff;
pub mod driver;
pub mod error;

pub use backoff::{Backoff, RetryConfig};
pub use driver::{DriverConfig, SessionDriver, Transfer};
pub use error::{ClientError, Result};
