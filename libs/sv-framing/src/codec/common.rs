//! Shared helpers for the block-based (H.264/H.265) unit layout.
//!
//! A NAL unit handed to this crate is normally preceded by an Annex B start
//! code. Upstream elements may have overwritten the first four bytes with a
//! big-endian size instead, so the prefix is detected rather than assumed.

/// How a block-based unit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `00 00 01` or `00 00 00 01`; `len` includes the `01` terminator.
    StartCode { len: usize },
    /// Four bytes that are not a start code, typically a replaced size field.
    Replaced,
    /// Four zero bytes. Not a valid unit start.
    Malformed,
    /// The codec has no prefix (AV1).
    None,
}

impl Prefix {
    /// Offset of the NAL header, if the prefix is usable.
    pub fn header_offset(self) -> Option<usize> {
        match self {
            Prefix::StartCode { len } => Some(len),
            Prefix::Replaced => Some(4),
            Prefix::None => Some(0),
            Prefix::Malformed => None,
        }
    }
}

/// Classify the prefix of a block-based unit.
///
/// Up to four leading zero bytes are counted. Two or three zeros followed by
/// `0x01` form a start code, four zeros are malformed, and anything else is
/// taken to be a 4-byte field that replaced the start code.
pub fn detect_prefix(unit: &[u8]) -> Prefix {
    let zeros = unit.iter().take(4).take_while(|&&b| b == 0).count();
    match zeros {
        4 => Prefix::Malformed,
        2 | 3 if unit.get(zeros) == Some(&0x01) => Prefix::StartCode { len: zeros + 1 },
        _ => Prefix::Replaced,
    }
}

/// Skip an SEI payload size starting at `pos`.
///
/// The size is a run of `0xFF` bytes closed by one non-`0xFF` byte. Returns
/// the offset just past the closing byte, or `None` if the unit ends first.
pub fn skip_sei_payload_size(unit: &[u8], mut pos: usize) -> Option<usize> {
    while *unit.get(pos)? == 0xff {
        pos += 1;
    }
    Some(pos + 1)
}

/// Find the next Annex B start code in the data starting from `from`.
///
/// Returns the position and length of the start code:
/// - 4-byte: `0x00 0x00 0x00 0x01` (length = 4)
/// - 3-byte: `0x00 0x00 0x01` (length = 3)
pub fn find_start_code(data: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 3 <= data.len() {
        if data[i..].starts_with(&[0, 0, 0, 1]) {
            return Some((i, 4));
        }
        if data[i..].starts_with(&[0, 0, 1]) {
            return Some((i, 3));
        }
        i += 1;
    }
    None
}

/// Iterator over the units of an Annex B byte stream.
///
/// Unlike a plain NAL iterator, each yielded slice keeps its start code so it
/// can be fed to the block-based path, which expects a prefixed unit. Bytes
/// before the first start code are skipped.
///
/// ```
/// use sv_framing::codec::AnnexBUnitIter;
///
/// let data = [
///     0x00, 0x00, 0x00, 0x01, 0x67, 0x42, // SPS
///     0x00, 0x00, 0x01, 0x68, 0xce,       // PPS
/// ];
/// let units: Vec<_> = AnnexBUnitIter::new(&data).collect();
/// assert_eq!(units[0], &[0x00, 0x00, 0x00, 0x01, 0x67, 0x42]);
/// assert_eq!(units[1], &[0x00, 0x00, 0x01, 0x68, 0xce]);
/// ```
pub struct AnnexBUnitIter<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> AnnexBUnitIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }
}

impl<'a> Iterator for AnnexBUnitIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let (start, len) = find_start_code(self.data, self.cursor)?;
        let end = match find_start_code(self.data, start + len) {
            Some((next, _)) => next,
            None => self.data.len(),
        };
        self.cursor = end;
        Some(&self.data[start..end])
    }
}
