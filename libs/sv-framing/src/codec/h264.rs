//! H.264/AVC signing SEI layout.
//!
//! ```text
//! [prefix][0x06 NAL header][0x05 payload type][size: 0xFF* + 1 byte][16-byte tag]...
//! ```

use super::common::skip_sei_payload_size;
use super::SEI_USER_DATA_UNREGISTERED;

/// H.264 NAL unit type constants.
pub mod nal_type {
    pub const NON_IDR_SLICE: u8 = 1;
    pub const IDR_SLICE: u8 = 5;
    pub const SEI: u8 = 6;
    pub const SPS: u8 = 7;
    pub const PPS: u8 = 8;
}

/// NAL header byte of a SEI with `forbidden_zero_bit = 0` and `nal_ref_idc = 0`.
pub const SEI_HEADER: u8 = nal_type::SEI;

/// NAL unit type is in the low 5 bits of the header byte.
#[inline]
pub fn nal_type(header_byte: u8) -> u8 {
    header_byte & 0x1f
}

/// Offset of the signing tag in `unit` if the NAL header at `pos` opens a
/// user-data-unregistered SEI.
pub fn signing_tag_offset(unit: &[u8], pos: usize) -> Option<usize> {
    if *unit.get(pos)? != SEI_HEADER || *unit.get(pos + 1)? != SEI_USER_DATA_UNREGISTERED {
        return None;
    }
    skip_sei_payload_size(unit, pos + 2)
}
