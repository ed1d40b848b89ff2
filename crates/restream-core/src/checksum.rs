//! Sequence checksum engine.
//!
//! A deterministic Blake3 digest over an ordered sequence of 32-bit integers,
//! rendered as a hex string. Equal sequences in the same order always produce
//! equal output; there is no collision-freedom claim.

/// Compute the checksum of an ordered `i32` sequence.
///
/// Each value is hashed as its little-endian byte encoding, so the digest is
/// a pure function of the values and their order.
pub fn sequence_checksum(values: &[i32]) -> String {
    let mut hasher = blake3::Hasher::new();
    for value in values {
        hasher.update(&value.to_le_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}
