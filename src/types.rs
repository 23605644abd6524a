//! Core types for sequential proof-of-work
//!
//! Fixed-size values carried through the chain, with hex display and serde
//! support, plus the hash rate type used by parameter analysis.

use crate::codec;
use crate::error::{ConfigError, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of a chain digest in bytes (SHA-256 / Blake2s-256 output)
pub const DIGEST_SIZE: usize = 32;

/// Size of the domain token in bytes
pub const TOKEN_SIZE: usize = 8;

/// Per-step search nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(pub u64);

impl Nonce {
    /// Create a new nonce
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the nonce value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Convert to the zero-padded big-endian hash input representation
    pub fn to_be_bytes(self) -> [u8; codec::U64_LEN] {
        codec::encode_u64(self.0)
    }

    /// Create from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; codec::U64_LEN]) -> Self {
        Self(codec::decode_u64(&bytes))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Nonce> for u64 {
    fn from(nonce: Nonce) -> Self {
        nonce.0
    }
}

/// Running digest carried from step to step
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainDigest([u8; DIGEST_SIZE]);

impl ChainDigest {
    /// Create a digest from its bytes
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a digest from a slice, checking its length
    pub fn from_slice(slice: &[u8]) -> std::result::Result<Self, ConfigError> {
        let bytes: [u8; DIGEST_SIZE] =
            slice.try_into().map_err(|_| ConfigError::DigestLength {
                expected: DIGEST_SIZE,
                actual: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Parse a hex-encoded digest
    pub fn from_hex(hex: &str) -> std::result::Result<Self, ConfigError> {
        let bytes = hex::decode(hex.trim()).map_err(|e| ConfigError::InvalidHex {
            field: "initial_digest",
            message: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }

    /// Get the digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// First four bytes read as a big-endian word; the difficulty window
    pub fn leading_word(&self) -> u32 {
        codec::decode_u32(&[self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Convert to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ChainDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainDigest({})", self.to_hex())
    }
}

impl fmt::Display for ChainDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for ChainDigest {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainDigest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Fixed-width token binding certificates to one application context
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainToken([u8; TOKEN_SIZE]);

impl DomainToken {
    /// Create a token from its bytes
    pub const fn from_bytes(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a token from a slice, checking its length
    pub fn from_slice(slice: &[u8]) -> std::result::Result<Self, ConfigError> {
        let bytes: [u8; TOKEN_SIZE] =
            slice.try_into().map_err(|_| ConfigError::TokenLength {
                expected: TOKEN_SIZE,
                actual: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Parse a hex-encoded token
    pub fn from_hex(hex: &str) -> std::result::Result<Self, ConfigError> {
        let bytes = hex::decode(hex.trim()).map_err(|e| ConfigError::InvalidHex {
            field: "token",
            message: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }

    /// Get the token bytes
    pub fn as_bytes(&self) -> &[u8; TOKEN_SIZE] {
        &self.0
    }

    /// Convert to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for DomainToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainToken({})", self.to_hex())
    }
}

impl fmt::Display for DomainToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for DomainToken {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DomainToken {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Hash rate in hashes per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashRate(pub f64);

impl HashRate {
    /// Create new hash rate
    pub fn new(rate: f64) -> Self {
        Self(rate)
    }

    /// Get the rate value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Parse from string with unit suffixes (K, M, G, T, P)
    pub fn from_str_with_units(s: &str) -> Result<Self> {
        let s = s.trim().to_uppercase();
        let (number, scale) = match s.chars().last() {
            Some('K') => (&s[..s.len() - 1], 1e3),
            Some('M') => (&s[..s.len() - 1], 1e6),
            Some('G') => (&s[..s.len() - 1], 1e9),
            Some('T') => (&s[..s.len() - 1], 1e12),
            Some('P') => (&s[..s.len() - 1], 1e15),
            _ => (s.as_str(), 1.0),
        };

        let base: f64 = number
            .trim()
            .parse()
            .map_err(|e| Error::encoding(format!("Invalid hash rate '{}': {}", s, e)))?;
        if !base.is_finite() || base <= 0.0 {
            return Err(Error::encoding(format!(
                "Hash rate must be positive, got '{}'",
                s
            )));
        }
        Ok(Self(base * scale))
    }
}

impl FromStr for HashRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_units(s)
    }
}

impl fmt::Display for HashRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::utils::format_hash_rate(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_bytes() {
        let nonce = Nonce::new(0x0123_4567_89AB_CDEF);
        assert_eq!(
            nonce.to_be_bytes(),
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]
        );
        assert_eq!(Nonce::from_be_bytes(nonce.to_be_bytes()), nonce);
    }

    #[test]
    fn test_nonce_conversions() {
        let nonce: Nonce = 999u64.into();
        assert_eq!(nonce.value(), 999);
        let value: u64 = nonce.into();
        assert_eq!(value, 999);
        assert_eq!(Nonce::default().value(), 0);
    }

    #[test]
    fn test_digest_length_checked() {
        assert!(ChainDigest::from_slice(&[0u8; 32]).is_ok());
        assert_eq!(
            ChainDigest::from_slice(&[0u8; 31]),
            Err(ConfigError::DigestLength {
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn test_digest_leading_word() {
        let mut bytes = [0u8; DIGEST_SIZE];
        bytes[..4].copy_from_slice(&[0x00, 0x0F, 0xFF, 0x01]);
        assert_eq!(ChainDigest::from_bytes(bytes).leading_word(), 0x000F_FF01);
    }

    #[test]
    fn test_digest_hex_roundtrip() {
        let digest = ChainDigest::from_bytes([0xAB; DIGEST_SIZE]);
        assert_eq!(ChainDigest::from_hex(&digest.to_hex()).unwrap(), digest);
        assert!(matches!(
            ChainDigest::from_hex("zz"),
            Err(ConfigError::InvalidHex { field: "initial_digest", .. })
        ));
    }

    #[test]
    fn test_token_length_checked() {
        assert!(DomainToken::from_hex("3d915a13fdc404e4").is_ok());
        assert_eq!(
            DomainToken::from_hex("3d915a13fdc404"),
            Err(ConfigError::TokenLength {
                expected: 8,
                actual: 7
            })
        );
    }

    #[test]
    fn test_token_serde() {
        let token = DomainToken::from_bytes(*b"Frobnica");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"46726f626e696361\"");
        let back: DomainToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_hash_rate_parsing() {
        assert_eq!(HashRate::from_str_with_units("100").unwrap().value(), 100.0);
        assert_eq!(HashRate::from_str_with_units("1K").unwrap().value(), 1_000.0);
        assert_eq!(HashRate::from_str_with_units("2.5m").unwrap().value(), 2_500_000.0);
        assert_eq!(HashRate::from_str_with_units("1G").unwrap().value(), 1e9);
        assert!(HashRate::from_str_with_units("fast").is_err());
        assert!(HashRate::from_str_with_units("0").is_err());
    }
}
