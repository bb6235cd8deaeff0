//! Content fingerprints for duplicate detection.

use sha2::{Digest, Sha512};

/// Computes the content hash stored on every asset (SHA-512, lowercase hex)
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCalculator;

impl HashCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_hash(&self, bytes: &[u8]) -> String {
        let mut hasher = Sha512::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = HashCalculator.calculate_hash(b"abc");
        assert_eq!(
            hash,
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_hash_consistency() {
        let hash1 = HashCalculator.calculate_hash(b"same bytes");
        let hash2 = HashCalculator.calculate_hash(b"same bytes");
        let hash3 = HashCalculator.calculate_hash(b"other bytes");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 128);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
