//! Digest primitive and identifier helpers shared by the audit ledger and the
//! commitment/proof pipeline.
//!
//! Every hash in the system is a lower-case hex SHA-256 digest produced through
//! [`HashPrimitive`], so tests and deployments can swap the digest without
//! touching the chain or proof code.

#![deny(unsafe_code)]

use chrono::{DateTime, SecondsFormat, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Deterministic one-way digest over a byte payload.
pub trait HashPrimitive: Send + Sync {
    /// Digest `data` and return the hex encoding.
    fn digest(&self, data: &[u8]) -> String;

    /// Digest a UTF-8 string.
    fn digest_str(&self, data: &str) -> String {
        self.digest(data.as_bytes())
    }

    /// Digest the concatenation `left ‖ right`.
    fn combine(&self, left: &str, right: &str) -> String {
        let mut joined = String::with_capacity(left.len() + right.len());
        joined.push_str(left);
        joined.push_str(right);
        self.digest_str(&joined)
    }
}

/// SHA-256 digest, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hash;

impl HashPrimitive for Sha256Hash {
    fn digest(&self, data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }
}

/// Fresh random nonce: 16 bytes from the thread RNG, hex encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate an identifier of the form `{prefix}_{epoch_ms}_{random}`.
pub fn generate_id(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..13])
}

/// Epoch milliseconds of a timestamp.
pub fn timestamp_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Render a timestamp the way it enters hashed canonical fields.
pub fn canonical_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sha256_matches_known_vector() {
        let hash = Sha256Hash.digest_str("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn combine_is_concatenation() {
        let h = Sha256Hash;
        assert_eq!(h.combine("ab", "c"), h.digest_str("abc"));
    }

    #[test]
    fn nonces_are_distinct_hex() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn ids_carry_prefix() {
        let id = generate_id("proof");
        assert!(id.starts_with("proof_"));
        assert_eq!(id.split('_').count(), 3);
        assert_ne!(id, generate_id("proof"));
    }

    #[test]
    fn canonical_timestamp_uses_millis_and_zulu() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T10:20:30.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(canonical_timestamp(&at), "2024-03-01T10:20:30.123Z");
    }

    #[test]
    fn timestamp_millis_truncates() {
        let at = DateTime::parse_from_rfc3339("1970-01-01T00:00:01.999900Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp_millis(&at), 1999);
    }

    proptest! {
        #[test]
        fn digest_is_deterministic_and_fixed_width(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let first = Sha256Hash.digest(&data);
            prop_assert_eq!(first.len(), 64);
            prop_assert_eq!(first, Sha256Hash.digest(&data));
        }
    }
}
