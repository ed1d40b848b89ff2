//! # Restream Server
//!
//! Accepts client connections and serves resumable integer-sequence
//! transfers.
//!
//! Each accepted connection is handled by its own tokio task; the only state
//! shared between handlers is the session store. A handler reads one
//! handshake, decides between fresh assignment, resume, and rejection, and
//! then streams sequence items until the sequence is exhausted or the
//! connection dies. Failures are isolated per connection: the accept loop
//! logs them and keeps listening.

pub mod error;
pub mod handshake;
pub mod server;

pub use error::{Result, ServerError};
pub use server::{Server, ServerConfig};
