//! Bit-packed certificate encoding
//!
//! A certificate stores one `nonce_bits`-wide group per step, in step order,
//! MSB-first from the most significant bit of byte 0. Groups are generally
//! not byte-aligned, so a group can straddle up to nine bytes. Any bits after
//! the last group are padding and must be zero.

use crate::codec::low_bits_mask;
use crate::error::{Error, Result};
use crate::types::Nonce;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bits in the `u128` window used to move one group in or out
const WINDOW_BITS: u32 = u128::BITS;

/// Geometry of a certificate: group width and group count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertificateLayout {
    nonce_bits: u32,
    steps: u32,
}

impl CertificateLayout {
    /// Create a layout for `steps` groups of `nonce_bits` bits (at most 64)
    pub const fn new(nonce_bits: u32, steps: u32) -> Self {
        Self { nonce_bits, steps }
    }

    /// Width of each group
    pub fn nonce_bits(&self) -> u32 {
        self.nonce_bits
    }

    /// Number of groups
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Bits used by all groups
    pub fn total_bits(&self) -> u64 {
        u64::from(self.steps) * u64::from(self.nonce_bits)
    }

    /// Certificate length in bytes
    pub fn byte_len(&self) -> usize {
        self.total_bits().div_ceil(8) as usize
    }

    /// Number of zero bits after the last group
    pub fn padding_bits(&self) -> u32 {
        (self.byte_len() as u64 * 8 - self.total_bits()) as u32
    }

    /// First bit of the group for `step`
    pub fn bit_offset(&self, step: u32) -> u64 {
        u64::from(step) * u64::from(self.nonce_bits)
    }

    /// Byte range touched by `step` and the bit position inside its first byte
    fn span(&self, step: u32) -> (usize, usize, u32) {
        let offset = self.bit_offset(step);
        let first = (offset / 8) as usize;
        let shift = (offset % 8) as u32;
        let touched = (shift + self.nonce_bits).div_ceil(8) as usize;
        (first, touched, shift)
    }

    /// Write the low `nonce_bits` bits of `nonce` into the group for `step`.
    ///
    /// Bits of neighbouring groups sharing a byte are left untouched; the
    /// group's own bits are replaced, so packing the same step twice keeps
    /// only the last value.
    pub fn pack(&self, buffer: &mut [u8], step: u32, nonce: Nonce) {
        if self.nonce_bits == 0 {
            return;
        }
        let (first, touched, shift) = self.span(step);
        let tail = WINDOW_BITS - shift - self.nonce_bits;
        let value = u128::from(nonce.value() & low_bits_mask(self.nonce_bits)) << tail;
        let group_mask = u128::from(low_bits_mask(self.nonce_bits)) << tail;

        for (i, byte) in buffer[first..first + touched].iter_mut().enumerate() {
            let pos = WINDOW_BITS - 8 * (i as u32 + 1);
            let clear = (group_mask >> pos) as u8;
            let bits = (value >> pos) as u8;
            *byte = (*byte & !clear) | bits;
        }
    }

    /// Read the group for `step`, ignoring bits of other groups
    pub fn unpack(&self, buffer: &[u8], step: u32) -> Nonce {
        if self.nonce_bits == 0 {
            return Nonce::new(0);
        }
        let (first, touched, shift) = self.span(step);
        let window = buffer[first..first + touched]
            .iter()
            .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte));
        let trailing = touched as u32 * 8 - shift - self.nonce_bits;
        Nonce::new((window >> trailing) as u64 & low_bits_mask(self.nonce_bits))
    }

    /// Whether all padding bits in `buffer` are zero
    pub fn padding_is_canonical(&self, buffer: &[u8]) -> bool {
        let padding = self.padding_bits();
        match buffer.last() {
            Some(&last) if padding > 0 => last & ((1u16 << padding) - 1) as u8 == 0,
            _ => true,
        }
    }

    /// Pack every nonce of a full chain into a new buffer
    pub fn pack_all(&self, nonces: &[Nonce]) -> Vec<u8> {
        let mut buffer = vec![0u8; self.byte_len()];
        for (step, nonce) in (0..self.steps).zip(nonces) {
            self.pack(&mut buffer, step, *nonce);
        }
        buffer
    }

    /// Unpack every group of `buffer`
    pub fn unpack_all(&self, buffer: &[u8]) -> Vec<Nonce> {
        (0..self.steps).map(|step| self.unpack(buffer, step)).collect()
    }
}

/// Completed certificate bytes
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Certificate {
    bytes: Vec<u8>,
}

impl Certificate {
    /// Wrap raw certificate bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the certificate bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the certificate holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Convert to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// `\xAB`-escaped dump, one escape per byte
    pub fn to_escaped(&self) -> String {
        utils::escape_bytes(&self.bytes)
    }

    /// Parse certificate text, either plain hex or `\x`-escaped bytes
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.contains("\\x") || text.contains("\\X") {
            return Ok(Self::from_bytes(utils::unescape_bytes(text)?));
        }

        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let hex = compact
            .strip_prefix("0x")
            .or_else(|| compact.strip_prefix("0X"))
            .unwrap_or(&compact);
        Ok(Self::from_bytes(hex::decode(hex)?))
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("len", &self.len())
            .field("hex", &self.to_hex())
            .finish()
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Certificate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Certificate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Certificate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
