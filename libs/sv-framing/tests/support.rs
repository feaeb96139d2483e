use std::collections::VecDeque;

use sv_framing::codec::av1::{self, obu_header};
use sv_framing::leb128::{encode_leb128, MAX_LEB128_BYTES};
use sv_framing::{
    AccumulatedValidation, AuthEngine, Authenticity, AuthenticityReport, Codec, EngineError,
    LatestValidation, PendingMetadata, ProductInfo, SigningEngine, SIGNING_TAG,
};

/// Build an AV1 OBU with the size field flag set.
#[allow(dead_code)]
pub fn obu(obu_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![obu_header(obu_type)];
    encode_leb128(body.len() as u64, &mut out);
    out.extend_from_slice(body);
    out
}

/// Build an AV1 user-private metadata OBU carrying the signing tag.
#[allow(dead_code)]
pub fn av1_signing_metadata(extra: &[u8]) -> Vec<u8> {
    let mut body = vec![av1::METADATA_TYPE_USER_PRIVATE, 0x00];
    body.extend_from_slice(&SIGNING_TAG);
    body.extend_from_slice(extra);
    obu(av1::obu_type::METADATA, &body)
}

/// SEI payload size as a run of 0xFF bytes and a terminator.
#[allow(dead_code)]
pub fn sei_size(mut size: usize, out: &mut Vec<u8>) {
    while size >= 255 {
        out.push(0xff);
        size -= 255;
    }
    out.push(size as u8);
}

/// H.264 NAL unit with a 4-byte start code.
#[allow(dead_code)]
pub fn h264_nal(header: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x00, 0x01, header];
    out.extend_from_slice(body);
    out
}

/// H.264 user-data-unregistered SEI carrying `uuid` followed by `extra`.
#[allow(dead_code)]
pub fn h264_sei(uuid: &[u8; 16], extra: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x00, 0x01, 0x06, 0x05];
    sei_size(uuid.len() + extra.len(), &mut out);
    out.extend_from_slice(uuid);
    out.extend_from_slice(extra);
    out.push(0x80);
    out
}

/// H.265 prefix SEI carrying `uuid` followed by `extra`.
#[allow(dead_code)]
pub fn h265_sei(uuid: &[u8; 16], extra: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x00, 0x01, 0x4e, 0x01, 0x05];
    sei_size(uuid.len() + extra.len(), &mut out);
    out.extend_from_slice(uuid);
    out.extend_from_slice(extra);
    out.push(0x80);
    out
}

#[allow(dead_code)]
pub fn contains_tag(unit: &[u8]) -> bool {
    unit.windows(SIGNING_TAG.len()).any(|w| w == &SIGNING_TAG[..])
}

/// Signing engine that emits one signing SEI after every `gop_len` ordinary
/// units and one more at end of stream.
#[allow(dead_code)]
pub struct FakeSigner {
    pub codec: Codec,
    pub gop_len: usize,
    pub signed: Vec<(Vec<u8>, Option<i64>)>,
    pub pending: VecDeque<PendingMetadata>,
    pub fail_next_poll: Option<EngineError>,
    pub end_of_stream: bool,
    ordinary: usize,
    emitted: u8,
}

#[allow(dead_code)]
impl FakeSigner {
    pub fn new(codec: Codec, gop_len: usize) -> Self {
        Self {
            codec,
            gop_len,
            signed: Vec::new(),
            pending: VecDeque::new(),
            fail_next_poll: None,
            end_of_stream: false,
            ordinary: 0,
            emitted: 0,
        }
    }

    /// Metadata unit as the engine returns it: four reserved bytes and then
    /// the NAL header. The last byte of the body counts emitted units.
    pub fn sei(&mut self) -> Vec<u8> {
        self.emitted += 1;
        let mut sei = match self.codec {
            Codec::H265 => h265_sei(&SIGNING_TAG, &[0x5a; 12]),
            _ => h264_sei(&SIGNING_TAG, &[0x5a; 12]),
        };
        sei[..4].fill(0);
        let last = sei.len() - 2;
        sei[last] = self.emitted;
        sei
    }

    pub fn signed_count(&self) -> usize {
        self.signed.len()
    }
}

impl SigningEngine for FakeSigner {
    fn create(codec: Codec) -> Result<Self, EngineError> {
        Ok(Self::new(codec, 2))
    }

    fn add_unit_for_signing(
        &mut self,
        unit: &[u8],
        timestamp_usec: Option<i64>,
    ) -> Result<(), EngineError> {
        if unit.is_empty() {
            return Err(EngineError::InvalidParameter);
        }
        self.signed.push((unit.to_vec(), timestamp_usec));
        if contains_tag(unit) {
            return Ok(());
        }
        self.ordinary += 1;
        if self.gop_len > 0 && self.ordinary % self.gop_len == 0 {
            let sei = self.sei();
            self.pending.push_back(PendingMetadata::prepend(sei));
        }
        Ok(())
    }

    fn next_metadata_to_prepend(&mut self) -> Result<Option<PendingMetadata>, EngineError> {
        if let Some(err) = self.fail_next_poll.take() {
            return Err(err);
        }
        Ok(self.pending.pop_front())
    }

    fn mark_end_of_stream(&mut self) -> Result<(), EngineError> {
        self.end_of_stream = true;
        let sei = self.sei();
        self.pending.push_back(PendingMetadata::prepend(sei));
        Ok(())
    }
}

/// Authentication engine that completes a validation every time it sees a
/// signing metadata unit, reporting the next scripted outcome.
#[allow(dead_code)]
pub struct FakeAuthenticator {
    pub codec: Codec,
    pub outcomes: VecDeque<Result<Authenticity, EngineError>>,
    pub received: Vec<Vec<u8>>,
    pub first_timestamp_usec: Option<i64>,
    pub last_timestamp_usec: Option<i64>,
    pub end_of_stream: bool,
}

#[allow(dead_code)]
impl FakeAuthenticator {
    pub fn new(
        codec: Codec,
        outcomes: impl IntoIterator<Item = Result<Authenticity, EngineError>>,
    ) -> Self {
        Self {
            codec,
            outcomes: outcomes.into_iter().collect(),
            received: Vec::new(),
            first_timestamp_usec: None,
            last_timestamp_usec: None,
            end_of_stream: false,
        }
    }

    fn report(&self, authenticity: Authenticity) -> AuthenticityReport {
        AuthenticityReport {
            latest_validation: LatestValidation {
                authenticity,
                validation_str: "..P".to_string(),
                timestamp_usec: self.last_timestamp_usec,
            },
            accumulated_validation: AccumulatedValidation {
                authenticity,
                received_units: self.received.len() as u64,
                validated_units: self.received.len() as u64,
                pending_units: 0,
                first_timestamp_usec: self.first_timestamp_usec,
                last_timestamp_usec: self.last_timestamp_usec,
            },
            product_info: ProductInfo {
                hardware_id: "hw-1".to_string(),
                firmware_version: "1.2.3".to_string(),
                serial_number: "SN0001".to_string(),
                manufacturer: "Test Cameras".to_string(),
                address: "Nowhere 1".to_string(),
            },
            this_version: "v2.0.0".to_string(),
            version_on_signing_side: "v1.9.0".to_string(),
        }
    }
}

impl AuthEngine for FakeAuthenticator {
    fn create(codec: Codec) -> Result<Self, EngineError> {
        Ok(Self::new(codec, []))
    }

    fn add_unit_and_authenticate(
        &mut self,
        unit: &[u8],
    ) -> Result<Option<AuthenticityReport>, EngineError> {
        self.received.push(unit.to_vec());
        let ts = self.received.len() as i64 * 1_000_000;
        self.first_timestamp_usec.get_or_insert(ts);
        self.last_timestamp_usec = Some(ts);

        // the engine sees H.264/H.265 units without their prefix
        let is_metadata = match self.codec {
            Codec::H264 | Codec::H265 => contains_tag(unit),
            Codec::Av1 => av1::signing_tag_offset(unit, MAX_LEB128_BYTES).is_some(),
        };
        if !is_metadata {
            return Ok(None);
        }
        match self.outcomes.pop_front() {
            Some(Ok(authenticity)) => Ok(Some(self.report(authenticity))),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    fn mark_end_of_stream(&mut self) -> Result<(), EngineError> {
        self.end_of_stream = true;
        Ok(())
    }

    fn authenticity_report(&mut self) -> Option<AuthenticityReport> {
        if self.received.is_empty() {
            return None;
        }
        Some(self.report(Authenticity::Ok))
    }
}
