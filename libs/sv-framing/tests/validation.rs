//! Integration tests for the validation session.

mod support;

use sv_framing::codec::av1::obu_type;
use sv_framing::{
    Authenticity, Codec, EngineError, FramingConfig, UnitClass, ValidationSession, VideoVerdict,
    SIGNING_TAG,
};
use support::{av1_signing_metadata, h264_nal, h264_sei, obu, FakeAuthenticator};

fn h264_stream() -> Vec<Vec<u8>> {
    vec![
        h264_nal(0x65, &[0x88, 0x01]),
        h264_sei(&SIGNING_TAG, &[0x01; 24]),
        h264_nal(0x41, &[0x9a, 0x02]),
        h264_sei(&SIGNING_TAG, &[0x02; 24]),
        h264_nal(0x41, &[0x9a, 0x03]),
    ]
}

fn validate(
    outcomes: Vec<Result<Authenticity, EngineError>>,
) -> ValidationSession<FakeAuthenticator> {
    let mut session = ValidationSession::with_engine(
        FakeAuthenticator::new(Codec::H264, outcomes),
        Codec::H264,
        &FramingConfig::default(),
    );
    for unit in h264_stream() {
        session.ingest_chunk(unit).unwrap();
    }
    session
}

#[test]
fn test_valid_video() {
    let mut session = validate(vec![Ok(Authenticity::Ok), Ok(Authenticity::OkWithMissingInfo)]);
    let summary = session.finalize().unwrap();
    assert!(session.engine().end_of_stream);
    assert_eq!(summary.verdict, VideoVerdict::Valid);
    assert_eq!(summary.tally.valid_gops, 2);
    assert_eq!(summary.this_version.as_deref(), Some("v2.0.0"));
    assert_eq!(summary.version_on_signing_side.as_deref(), Some("v1.9.0"));
    assert_eq!(summary.product_info.unwrap().serial_number, "SN0001");
    assert_eq!(summary.first_timestamp_usec, Some(1_000_000));
    assert_eq!(summary.last_timestamp_usec, Some(5_000_000));
}

#[test]
fn test_invalid_gop_wins() {
    let mut session = validate(vec![Ok(Authenticity::NotSigned), Ok(Authenticity::NotOk)]);
    let summary = session.finalize().unwrap();
    assert_eq!(summary.verdict, VideoVerdict::Invalid);
    assert_eq!(summary.tally.invalid_gops, 1);
    assert_eq!(summary.tally.unsigned_gops, 1);
}

#[test]
fn test_engine_failure_is_per_unit() {
    let mut session = ValidationSession::with_engine(
        FakeAuthenticator::new(
            Codec::H264,
            [Err(EngineError::Authenticity), Ok(Authenticity::Ok)],
        ),
        Codec::H264,
        &FramingConfig::default(),
    );
    let stream = h264_stream();

    session.ingest_chunk(stream[0].clone()).unwrap();
    let verdicts = session.ingest_chunk(stream[1].clone()).unwrap();
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].unit.class, UnitClass::SigningMetadata);
    assert_eq!(verdicts[0].outcome, Err(EngineError::Authenticity));

    session.ingest_chunk(stream[2].clone()).unwrap();
    let verdicts = session.ingest_chunk(stream[3].clone()).unwrap();
    let latest = verdicts[0].outcome.clone().unwrap().unwrap();
    assert_eq!(latest.authenticity, Authenticity::Ok);

    let tally = session.tally();
    assert_eq!(tally.engine_errors, 1);
    assert_eq!(tally.valid_gops, 1);
}

#[test]
fn test_unsigned_stream() {
    let mut session = ValidationSession::with_engine(
        FakeAuthenticator::new(Codec::H264, []),
        Codec::H264,
        &FramingConfig::default(),
    );
    session.ingest_chunk(h264_nal(0x65, &[0x88])).unwrap();
    let summary = session.finalize().unwrap();
    assert_eq!(summary.verdict, VideoVerdict::NoCompleteGops);
    assert!(summary.product_info.is_none());
    assert_eq!(summary.footprint.metadata_bytes, 0);
}

#[test]
fn test_footprint_in_summary() {
    let stream = h264_stream();
    let metadata = (stream[1].len() + stream[3].len()) as u64;
    let total: usize = stream.iter().map(Vec::len).sum();
    let mut session = validate(vec![Ok(Authenticity::Ok), Ok(Authenticity::Ok)]);
    let summary = session.finalize().unwrap();
    assert_eq!(summary.footprint.total_bytes, total as u64);
    assert_eq!(summary.footprint.metadata_bytes, metadata);
}

#[test]
fn test_av1_chunked_validation() {
    let stream = [
        obu(obu_type::TEMPORAL_DELIMITER, &[]),
        obu(obu_type::FRAME, &[0x10; 90]),
        av1_signing_metadata(&[0x20; 40]),
        obu(obu_type::FRAME, &[0x30; 70]),
    ]
    .concat();
    let mut session = ValidationSession::with_engine(
        FakeAuthenticator::new(Codec::Av1, [Ok(Authenticity::SignaturePresent)]),
        Codec::Av1,
        &FramingConfig::default(),
    );
    let mut units = 0;
    for chunk in stream.chunks(13) {
        units += session.ingest_chunk(chunk.to_vec()).unwrap().len();
    }
    assert_eq!(units, 4);
    // AV1 units reach the engine whole
    assert_eq!(session.engine().received.concat(), stream);

    let summary = session.finalize().unwrap();
    assert_eq!(summary.tally.pending_gops, 1);
    assert_eq!(summary.verdict, VideoVerdict::NoCompleteGops);
}
