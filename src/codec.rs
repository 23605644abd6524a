//! Big-endian codec for fixed-width integers
//!
//! Every numeric field that enters a hash input is written in canonical
//! big-endian order so that provers and verifiers on any platform hash the
//! same bytes.

use byteorder::{BigEndian, ByteOrder};

/// Width of an encoded `u32` field in bytes
pub const U32_LEN: usize = 4;

/// Width of an encoded `u64` field in bytes
pub const U64_LEN: usize = 8;

/// Encodes a `u32` in big-endian order.
pub fn encode_u32(value: u32) -> [u8; U32_LEN] {
    let mut out = [0u8; U32_LEN];
    BigEndian::write_u32(&mut out, value);
    out
}

/// Encodes a `u64` in big-endian order.
pub fn encode_u64(value: u64) -> [u8; U64_LEN] {
    let mut out = [0u8; U64_LEN];
    BigEndian::write_u64(&mut out, value);
    out
}

/// Decodes a big-endian `u32`.
pub fn decode_u32(bytes: &[u8; U32_LEN]) -> u32 {
    BigEndian::read_u32(bytes)
}

/// Decodes a big-endian `u64`.
pub fn decode_u64(bytes: &[u8; U64_LEN]) -> u64 {
    BigEndian::read_u64(bytes)
}

/// Mask selecting the low `bits` bits of a `u64` (`bits` ≤ 64).
pub fn low_bits_mask(bits: u32) -> u64 {
    match bits {
        0 => 0,
        b if b >= 64 => u64::MAX,
        b => (1u64 << b) - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_u32() {
        assert_eq!(encode_u32(0x0102_0304), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(decode_u32(&[0x01, 0x02, 0x03, 0x04]), 0x0102_0304);
    }

    #[test]
    fn test_encode_u64_is_zero_padded() {
        assert_eq!(encode_u64(0x1234), [0, 0, 0, 0, 0, 0, 0x12, 0x34]);
        assert_eq!(decode_u64(&encode_u64(u64::MAX)), u64::MAX);
    }

    #[test]
    fn test_low_bits_mask() {
        assert_eq!(low_bits_mask(0), 0);
        assert_eq!(low_bits_mask(1), 1);
        assert_eq!(low_bits_mask(12), 0xFFF);
        assert_eq!(low_bits_mask(63), u64::MAX >> 1);
        assert_eq!(low_bits_mask(64), u64::MAX);
    }
}
