//! AV1 OBU (Open Bitstream Unit) layout.
//!
//! # OBU Header
//!
//! ```text
//! bit 7    forbidden
//! bit 6-3  obu_type
//! bit 2    obu_extension_flag (one extension byte follows)
//! bit 1    obu_has_size_field
//! bit 0    reserved
//! ```
//!
//! A signing metadata OBU then reads:
//!
//! ```text
//! [header][leb128 size][metadata_type = 25][1 byte][16-byte tag]...
//! ```

use crate::leb128::decode_leb128_bounded;

/// AV1 OBU type constants.
pub mod obu_type {
    pub const SEQUENCE_HEADER: u8 = 1;
    pub const TEMPORAL_DELIMITER: u8 = 2;
    pub const FRAME_HEADER: u8 = 3;
    pub const TILE_GROUP: u8 = 4;
    pub const METADATA: u8 = 5;
    pub const FRAME: u8 = 6;
    pub const PADDING: u8 = 15;
}

/// First metadata type of the unregistered user private range.
pub const METADATA_TYPE_USER_PRIVATE: u8 = 25;

/// Smallest metadata payload that can hold the type byte, the intermediate
/// byte and the signing tag.
pub const MIN_SIGNING_METADATA_SIZE: u64 = 2 + super::SIGNING_TAG.len() as u64;

/// OBU type is in bits 3-6 of the first byte: `(obu_header >> 3) & 0x0f`.
#[inline]
pub fn obu_type(header_byte: u8) -> u8 {
    (header_byte >> 3) & 0x0f
}

#[inline]
pub fn obu_has_extension(header_byte: u8) -> bool {
    (header_byte & 0x04) != 0
}

#[inline]
pub fn obu_has_size(header_byte: u8) -> bool {
    (header_byte & 0x02) != 0
}

/// Length of the OBU header proper, not counting the size field.
#[inline]
pub fn obu_header_len(header_byte: u8) -> usize {
    if obu_has_extension(header_byte) { 2 } else { 1 }
}

/// Build an OBU header byte with the size field flag set.
#[inline]
pub const fn obu_header(obu_type: u8) -> u8 {
    ((obu_type & 0x0f) << 3) | 0x02
}

/// Offset of the signing tag in `unit` if it is a user-private metadata OBU
/// large enough to carry one. The size field may run to `max_leb128_bytes`.
pub fn signing_tag_offset(unit: &[u8], max_leb128_bytes: usize) -> Option<usize> {
    let header = *unit.first()?;
    if obu_type(header) != obu_type::METADATA {
        return None;
    }
    let mut pos = obu_header_len(header);
    let (size, leb_len) = decode_leb128_bounded(unit.get(pos..)?, max_leb128_bytes).ok()?;
    if size < MIN_SIGNING_METADATA_SIZE {
        return None;
    }
    pos += leb_len;
    if *unit.get(pos)? != METADATA_TYPE_USER_PRIVATE {
        return None;
    }
    Some(pos + 2)
}
