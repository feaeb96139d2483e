use bytes::Bytes;

use crate::codec::Codec;
use crate::inspect::{classify, UnitClass};

/// The units of one encoder output instant, in stream order.
///
/// Units may be inserted anywhere until the access unit is handed on with
/// [`AccessUnit::into_units`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessUnit {
    units: Vec<Bytes>,
    pub timestamp_usec: Option<i64>,
}

impl AccessUnit {
    pub fn new(timestamp_usec: Option<i64>) -> Self {
        Self {
            units: Vec::new(),
            timestamp_usec,
        }
    }

    pub fn push(&mut self, unit: impl Into<Bytes>) {
        self.units.push(unit.into());
    }

    /// Insert `unit` before the unit currently at `idx`. An `idx` past the end
    /// appends.
    pub fn insert(&mut self, idx: usize, unit: impl Into<Bytes>) {
        let idx = idx.min(self.units.len());
        self.units.insert(idx, unit.into());
    }

    pub fn get(&self, idx: usize) -> Option<&Bytes> {
        self.units.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Classification of the unit at `idx`, computed from its current bytes.
    pub fn classify(&self, idx: usize, codec: Codec) -> Option<UnitClass> {
        self.units.get(idx).map(|unit| classify(unit, codec))
    }

    /// Sum of all unit lengths.
    pub fn total_len(&self) -> usize {
        self.units.iter().map(Bytes::len).sum()
    }

    pub fn into_units(self) -> Vec<Bytes> {
        self.units
    }
}

impl FromIterator<Bytes> for AccessUnit {
    fn from_iter<I: IntoIterator<Item = Bytes>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
            timestamp_usec: None,
        }
    }
}
