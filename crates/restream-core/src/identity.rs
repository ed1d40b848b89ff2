//! Client identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a logical client.
///
/// A `ClientId` is assigned once per client lifetime, not per connection: the
/// same identity is presented on every reconnect so the server can find the
/// session that belongs to a returning client. It is the session-store key.
///
/// Each driver instance carries its own identity; identities are never
/// process-global, so multiple logical clients in one process do not collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Create an identity from a caller-chosen string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random identity (16 random bytes, hex-encoded).
    pub fn random() -> Self {
        use rand::Rng;
        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(hex::encode(bytes))
    }

    /// View the identity as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_distinct() {
        let a = ClientId::random();
        let b = ClientId::random();
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_id_is_hex() {
        let id = ClientId::random();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_explicit_id_round_trips() {
        let id = ClientId::new("client-7");
        assert_eq!(id.as_str(), "client-7");
        assert_eq!(id.to_string(), "client-7");
    }
}
