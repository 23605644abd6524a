//! Hash-input assembly
//!
//! Layout hashed at every step:
//!
//! ```text
//! offset  len  field
//!      0   32  running digest
//!     32    8  nonce (big-endian u64)
//!     40    8  domain token
//!     48    4  step index (big-endian u32)
//! ```
//!
//! The buffer is assembled once per step; only the nonce field changes
//! between candidates.

use crate::codec;
use crate::types::{ChainDigest, DomainToken, Nonce, DIGEST_SIZE, TOKEN_SIZE};
use std::fmt;

/// Offset of the running digest
pub const DIGEST_OFFSET: usize = 0;
/// Offset of the nonce
pub const NONCE_OFFSET: usize = DIGEST_OFFSET + DIGEST_SIZE;
/// Width of the nonce field
pub const NONCE_LEN: usize = codec::U64_LEN;
/// Offset of the domain token
pub const TOKEN_OFFSET: usize = NONCE_OFFSET + NONCE_LEN;
/// Offset of the step index
pub const STEP_OFFSET: usize = TOKEN_OFFSET + TOKEN_SIZE;
/// Width of the step index field
pub const STEP_LEN: usize = codec::U32_LEN;
/// Total size of one hash input
pub const HASH_INPUT_SIZE: usize = STEP_OFFSET + STEP_LEN;

/// Maximum nonce width in bits that the nonce field can carry
pub const MAX_NONCE_BITS: u32 = (NONCE_LEN * 8) as u32;

/// Bytes hashed for one candidate at one step
#[derive(Clone, PartialEq, Eq)]
pub struct HashInput {
    bytes: [u8; HASH_INPUT_SIZE],
}

impl HashInput {
    /// Assemble the input for `step` with a zero nonce
    pub fn new(last_digest: &ChainDigest, token: &DomainToken, step: u32) -> Self {
        let mut bytes = [0u8; HASH_INPUT_SIZE];
        bytes[DIGEST_OFFSET..NONCE_OFFSET].copy_from_slice(last_digest.as_bytes());
        bytes[TOKEN_OFFSET..STEP_OFFSET].copy_from_slice(token.as_bytes());
        bytes[STEP_OFFSET..].copy_from_slice(&codec::encode_u32(step));
        Self { bytes }
    }

    /// Assemble the complete input in one call
    pub fn assemble(
        last_digest: &ChainDigest,
        nonce: Nonce,
        token: &DomainToken,
        step: u32,
    ) -> Self {
        let mut input = Self::new(last_digest, token, step);
        input.set_nonce(nonce);
        input
    }

    /// Overwrite the nonce field
    #[inline]
    pub fn set_nonce(&mut self, nonce: Nonce) {
        self.bytes[NONCE_OFFSET..TOKEN_OFFSET].copy_from_slice(&nonce.to_be_bytes());
    }

    /// Nonce currently in the buffer
    pub fn nonce(&self) -> Nonce {
        let mut field = [0u8; NONCE_LEN];
        field.copy_from_slice(&self.bytes[NONCE_OFFSET..TOKEN_OFFSET]);
        Nonce::from_be_bytes(field)
    }

    /// Step index encoded in the buffer
    pub fn step(&self) -> u32 {
        let mut field = [0u8; STEP_LEN];
        field.copy_from_slice(&self.bytes[STEP_OFFSET..]);
        codec::decode_u32(&field)
    }

    /// Get the input bytes
    pub fn as_bytes(&self) -> &[u8; HASH_INPUT_SIZE] {
        &self.bytes
    }

    /// Convert to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for HashInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashInput")
            .field("step", &self.step())
            .field("nonce", &self.nonce())
            .field("hex", &self.to_hex())
            .finish()
    }
}
