//! # Restream Core
//!
//! Pure primitives for restream: client identity and the sequence checksum.
//!
//! This crate contains no I/O and no networking. It is shared by the client,
//! server, and protocol crates.
//!
//! ## Key Types
//!
//! - [`ClientId`] - Opaque identity of a logical client, stable across reconnects
//! - [`sequence_checksum`] - Deterministic digest over an ordered `i32` sequence

pub mod checksum;
pub mod identity;

pub use checksum::sequence_checksum;
pub use identity::ClientId;
