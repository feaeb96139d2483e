use std::ops::AddAssign;

use serde::Serialize;

/// Running byte totals for one session.
///
/// Both counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Footprint {
    pub total_bytes: u64,
    pub metadata_bytes: u64,
}

impl Footprint {
    pub fn record(&mut self, unit_len: usize, is_metadata: bool) {
        let len = unit_len as u64;
        self.total_bytes = self.total_bytes.saturating_add(len);
        if is_metadata {
            self.metadata_bytes = self.metadata_bytes.saturating_add(len);
        }
    }

    /// Share of all bytes that were signing metadata, `0.0` before any unit
    /// was recorded.
    pub fn metadata_ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.metadata_bytes as f64 / self.total_bytes as f64
        }
    }
}

impl AddAssign for Footprint {
    fn add_assign(&mut self, rhs: Self) {
        self.total_bytes = self.total_bytes.saturating_add(rhs.total_bytes);
        self.metadata_bytes = self.metadata_bytes.saturating_add(rhs.metadata_bytes);
    }
}
