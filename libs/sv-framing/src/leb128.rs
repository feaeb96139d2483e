//! LEB128 (Little Endian Base 128) size fields.
//!
//! AV1 encodes OBU sizes and metadata payload sizes as leb128: seven value
//! bits per byte, least significant group first, with the high bit set on
//! every byte except the last.

use thiserror::Error;

/// Default bound on the length of a leb128 field. The AV1 bitstream never
/// emits more than eight bytes for a size.
pub const MAX_LEB128_BYTES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Leb128Error {
    /// Input ended before the terminating byte; more data may complete it.
    #[error("leb128 field truncated")]
    Truncated,
    /// The field never terminated within the bound, or its value does not fit in 64 bits.
    #[error("leb128 field exceeds {0} bytes")]
    Overflow(usize),
}

/// Decode a leb128 value, bounded by [`MAX_LEB128_BYTES`].
///
/// Returns `(value, bytes_consumed)`.
///
/// ```
/// use sv_framing::leb128::decode_leb128;
///
/// assert_eq!(decode_leb128(&[0xac, 0x02]), Ok((300, 2)));
/// ```
pub fn decode_leb128(bytes: &[u8]) -> Result<(u64, usize), Leb128Error> {
    decode_leb128_bounded(bytes, MAX_LEB128_BYTES)
}

/// Decode a leb128 value reading at most `max_bytes` bytes.
pub fn decode_leb128_bounded(bytes: &[u8], max_bytes: usize) -> Result<(u64, usize), Leb128Error> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for i in 0..max_bytes {
        let Some(&byte) = bytes.get(i) else {
            return Err(Leb128Error::Truncated);
        };
        let group = (byte & 0x7f) as u64;
        // bits that would be shifted out of the u64
        if shift >= 64 || (shift > 57 && group >> (64 - shift) != 0) {
            return Err(Leb128Error::Overflow(max_bytes));
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }
    Err(Leb128Error::Overflow(max_bytes))
}

/// Append `value` to `out` in leb128 form.
pub fn encode_leb128(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Number of bytes [`encode_leb128`] emits for `value`.
pub fn leb128_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}
