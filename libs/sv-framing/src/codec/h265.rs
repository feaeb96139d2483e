//! H.265/HEVC signing SEI layout.
//!
//! The NAL header is two bytes; the type is in bits 1-6 of the first byte:
//! `(byte0 >> 1) & 0x3f`. The SEI payload type follows the header.

use super::common::skip_sei_payload_size;
use super::SEI_USER_DATA_UNREGISTERED;

/// H.265 NAL unit type constants.
pub mod nal_type {
    pub const IDR_W_RADL: u8 = 19;
    pub const IDR_N_LP: u8 = 20;
    pub const VPS: u8 = 32;
    pub const SPS: u8 = 33;
    pub const PPS: u8 = 34;
    pub const PREFIX_SEI: u8 = 39;
    pub const SUFFIX_SEI: u8 = 40;
}

#[inline]
pub fn nal_type(header_byte: u8) -> u8 {
    (header_byte >> 1) & 0x3f
}

pub fn signing_tag_offset(unit: &[u8], pos: usize) -> Option<usize> {
    if nal_type(*unit.get(pos)?) != nal_type::PREFIX_SEI
        || *unit.get(pos + 2)? != SEI_USER_DATA_UNREGISTERED
    {
        return None;
    }
    skip_sei_payload_size(unit, pos + 3)
}
