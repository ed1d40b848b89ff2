//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// The in-memory store is infallible in practice; the variants exist so the
/// trait can host fallible backends without changing its signature.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
