//! The SessionStore trait: abstract interface for session retention.

use std::sync::Arc;

use async_trait::async_trait;
use restream_core::ClientId;

use crate::error::Result;

/// Async interface for session storage.
///
/// Implementations must be safe for concurrent `put`/`get` from many
/// connection handlers. No ordering is guaranteed across identities, but
/// operations on the same identity are linearizable: a `get` issued after a
/// `put` for the same identity observes that `put`.
///
/// # Design Notes
///
/// - **Overwrite on put**: a fresh handshake replaces any prior session for
///   the identity; there is at most one live session per client.
/// - **Lazy expiry**: expiration is evaluated at read time. No background
///   sweep is required, though an implementation may run one.
/// - **Shared sequences**: sequences come back as `Arc<Vec<i32>>` so replay
///   never copies a stored sequence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record `sequence` under `client` with a freshly started TTL,
    /// overwriting any prior session for that identity.
    async fn put(&self, client: &ClientId, sequence: Arc<Vec<i32>>) -> Result<()>;

    /// Fetch the sequence stored under `client`.
    ///
    /// Returns `None` if no session exists or the session has expired.
    async fn get(&self, client: &ClientId) -> Result<Option<Arc<Vec<i32>>>>;
}
