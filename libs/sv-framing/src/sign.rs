//! Signing side of a stream session.

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::access_unit::AccessUnit;
use crate::codec::Codec;
use crate::config::FramingConfig;
use crate::engine::{EngineError, SigningEngine};
use crate::error::Error;
use crate::footprint::Footprint;
use crate::framer::{engine_payload, Framer};
use crate::synth::drain_pending_metadata;

/// An access unit after signing, with the engine failures met on the way.
///
/// The access unit is always complete: every framed unit is kept, and so is
/// every metadata unit inserted before a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedAccessUnit {
    pub au: AccessUnit,
    /// Metadata units inserted into `au`.
    pub inserted: usize,
    /// Engine failures keyed by the index in `au` of the unit being signed
    /// when they happened.
    pub engine_errors: Vec<(usize, EngineError)>,
}

impl SignedAccessUnit {
    fn new(au: AccessUnit) -> Self {
        Self {
            au,
            ..Self::default()
        }
    }

    /// Whether every unit went through the engine without a failure.
    pub fn is_clean(&self) -> bool {
        self.engine_errors.is_empty()
    }

    pub fn into_access_unit(self) -> AccessUnit {
        self.au
    }
}

/// Frames a stream, feeds every unit to a signing engine and inserts the
/// metadata units the engine produces.
///
/// Engine failures are reported per unit and leave the session usable.
pub struct SigningSession<E> {
    framer: Framer,
    engine: E,
    last_timestamp_usec: Option<i64>,
}

impl<E: SigningEngine> SigningSession<E> {
    pub fn create(codec: Codec, config: &FramingConfig) -> Result<Self, Error> {
        let engine = E::create(codec)?;
        Ok(Self::with_engine(engine, codec, config))
    }

    pub fn with_engine(engine: E, codec: Codec, config: &FramingConfig) -> Self {
        Self {
            framer: Framer::new(codec, config),
            engine,
            last_timestamp_usec: None,
        }
    }

    /// Frame `chunk` into an access unit and sign it.
    ///
    /// Only framing errors are returned as `Err`; engine failures travel with
    /// the access unit.
    pub fn ingest_chunk(
        &mut self,
        chunk: impl Into<Bytes>,
        timestamp_usec: Option<i64>,
    ) -> Result<SignedAccessUnit, Error> {
        let units = self.framer.ingest_chunk(chunk)?;
        let mut au: AccessUnit = units.into_iter().map(|unit| unit.data).collect();
        au.timestamp_usec = timestamp_usec;
        self.last_timestamp_usec = timestamp_usec;
        let mut signed = SignedAccessUnit::new(au);
        self.sign_access_unit(&mut signed);
        Ok(signed)
    }

    /// Hand each unit of `signed.au` to the engine, inserting any pending
    /// metadata in front of the unit it was generated for.
    ///
    /// Inserted units are signed like any other unit and counted in the
    /// footprint. A failing engine call is recorded against the unit at hand
    /// and signing moves on.
    pub fn sign_access_unit(&mut self, signed: &mut SignedAccessUnit) {
        let codec = self.framer.codec();
        let au = &mut signed.au;
        let mut idx = 0;
        while idx < au.len() {
            let drained = drain_pending_metadata(&mut self.engine, au, idx, codec);
            for unit in au.iter().skip(idx).take(drained.inserted) {
                self.framer.record(unit);
            }
            signed.inserted += drained.inserted;
            if let Some(err) = drained.error {
                signed.engine_errors.push((idx + drained.inserted, err));
            }

            if let Some(unit) = au.get(idx) {
                if let Err(err) = self
                    .engine
                    .add_unit_for_signing(engine_payload(unit, codec), au.timestamp_usec)
                {
                    warn!(%err, idx, "engine failed to sign unit");
                    signed.engine_errors.push((idx, err));
                }
            }
            idx += 1;
        }
        if signed.inserted > 0 {
            info!(inserted = signed.inserted, units = au.len(), "signed access unit");
        }
    }

    /// Mark the end of the stream and collect the metadata the engine still
    /// holds into a final access unit stamped with the last timestamp seen.
    ///
    /// Returns `None` if the engine had nothing left and did not fail.
    pub fn finalize(&mut self) -> Result<Option<SignedAccessUnit>, Error> {
        self.framer.discard_pending();
        self.engine.mark_end_of_stream()?;
        let codec = self.framer.codec();
        let mut signed = SignedAccessUnit::new(AccessUnit::new(self.last_timestamp_usec));
        let drained = drain_pending_metadata(&mut self.engine, &mut signed.au, 0, codec);
        for unit in signed.au.iter() {
            self.framer.record(unit);
        }
        signed.inserted = drained.inserted;
        if let Some(err) = drained.error {
            signed.engine_errors.push((drained.inserted, err));
        }
        debug!(inserted = signed.inserted, "end of stream");
        Ok((!signed.au.is_empty() || !signed.is_clean()).then_some(signed))
    }

    pub fn footprint(&self) -> Footprint {
        self.framer.footprint()
    }

    pub fn codec(&self) -> Codec {
        self.framer.codec()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
