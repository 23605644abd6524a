//! Hashing for the step chain
//!
//! Provides the digest function used at every step and the leading-zero-bit
//! difficulty predicate. SHA-256 is the default; Blake2s-256 is available as
//! an alternative with the same 32-byte output. Certificates produced with
//! one algorithm never verify under the other.

use crate::types::{ChainDigest, DIGEST_SIZE};
use blake2::Blake2s256;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Maximum difficulty; the predicate only inspects the first 32-bit word
pub const MAX_DIFFICULTY: u32 = 32;

/// Digest functions supported for the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// Blake2s with 256-bit output
    Blake2s,
}

impl HashAlgorithm {
    /// Create a reusable hasher for this algorithm
    pub fn hasher(self) -> ChainHasher {
        ChainHasher::new(self)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => write!(f, "sha256"),
            HashAlgorithm::Blake2s => write!(f, "blake2s"),
        }
    }
}

enum Inner {
    Sha256(Sha256),
    Blake2s(Blake2s256),
}

/// Reusable hasher for chain inputs
pub struct ChainHasher {
    inner: Inner,
}

impl ChainHasher {
    /// Create a new hasher for the given algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let inner = match algorithm {
            HashAlgorithm::Sha256 => Inner::Sha256(Sha256::new()),
            HashAlgorithm::Blake2s => Inner::Blake2s(Blake2s256::new()),
        };
        Self { inner }
    }

    /// Algorithm this hasher computes
    pub fn algorithm(&self) -> HashAlgorithm {
        match self.inner {
            Inner::Sha256(_) => HashAlgorithm::Sha256,
            Inner::Blake2s(_) => HashAlgorithm::Blake2s,
        }
    }

    /// Hash data and return the digest
    pub fn digest(&mut self, data: &[u8]) -> ChainDigest {
        let bytes: [u8; DIGEST_SIZE] = match &mut self.inner {
            Inner::Sha256(hasher) => {
                hasher.update(data);
                hasher.finalize_reset().into()
            }
            Inner::Blake2s(hasher) => {
                hasher.update(data);
                hasher.finalize_reset().into()
            }
        };
        ChainDigest::from_bytes(bytes)
    }
}

impl fmt::Debug for ChainHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainHasher")
            .field("algorithm", &self.algorithm())
            .finish()
    }
}

/// Mask selecting the top `difficulty` bits of a 32-bit word.
///
/// Difficulties above [`MAX_DIFFICULTY`] are clamped; configuration
/// validation rejects them before this is reached.
pub fn difficulty_mask(difficulty: u32) -> u32 {
    match difficulty {
        0 => 0,
        d if d >= MAX_DIFFICULTY => u32::MAX,
        d => !(u32::MAX >> d),
    }
}

/// Leading-zero-bit predicate: the masked leading word must be zero
#[inline]
pub fn meets_difficulty(digest: &ChainDigest, mask: u32) -> bool {
    digest.leading_word() & mask == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_answer() {
        let mut hasher = HashAlgorithm::Sha256.hasher();
        let digest = hasher.digest(b"abc");
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hasher_resets_between_calls() {
        let mut hasher = HashAlgorithm::Blake2s.hasher();
        let first = hasher.digest(b"test data");
        let second = hasher.digest(b"test data");
        assert_eq!(first, second);

        let other = hasher.digest(b"different data");
        assert_ne!(first, other);
    }

    #[test]
    fn test_algorithms_differ() {
        let sha = HashAlgorithm::Sha256.hasher().digest(b"spow");
        let blake = HashAlgorithm::Blake2s.hasher().digest(b"spow");
        assert_ne!(sha, blake);
    }

    #[test]
    fn test_difficulty_mask() {
        assert_eq!(difficulty_mask(0), 0);
        assert_eq!(difficulty_mask(1), 0x8000_0000);
        assert_eq!(difficulty_mask(12), 0xFFF0_0000);
        assert_eq!(difficulty_mask(32), u32::MAX);
    }

    #[test]
    fn test_meets_difficulty() {
        let mut bytes = [0xFFu8; DIGEST_SIZE];
        bytes[0] = 0x00;
        bytes[1] = 0x0F;
        let digest = ChainDigest::from_bytes(bytes);

        assert!(meets_difficulty(&digest, difficulty_mask(0)));
        assert!(meets_difficulty(&digest, difficulty_mask(8)));
        assert!(meets_difficulty(&digest, difficulty_mask(12)));
        assert!(!meets_difficulty(&digest, difficulty_mask(13)));
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(HashAlgorithm::Sha256.to_string(), "sha256");
        assert_eq!(HashAlgorithm::Blake2s.to_string(), "blake2s");
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
    }
}
