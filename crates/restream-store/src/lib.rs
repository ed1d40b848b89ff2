//! # Restream Store
//!
//! Server-side session storage: the mapping from a [`ClientId`] to the exact
//! sequence it was assigned, with bounded retention.
//!
//! A session is created on every fresh handshake and read (never mutated) on
//! every resume. Retention is a sliding TTL: each successful read restarts
//! the clock, so an actively resuming client keeps its session alive while
//! idle sessions age out. Once expired, a session is indistinguishable from
//! one that never existed.
//!
//! [`ClientId`]: restream_core::ClientId

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemorySessionStore;
pub use traits::SessionStore;
