//! The joined representation of a station: its metadata row together with the
//! complete discharge series loaded from the station's source file.

use crate::types::reading::Reading;
use crate::types::station::StationRecord;
use serde::Serialize;

/// A station record paired with its ordered readings.
///
/// Built once by [`crate::SeriesJoiner`] and never modified. Derived values such
/// as coverage are computed on demand with [`crate::coverage`].
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StationSeries {
    record: StationRecord,
    readings: Vec<Reading>,
}

impl StationSeries {
    pub fn new(record: StationRecord, readings: Vec<Reading>) -> Self {
        Self { record, readings }
    }

    pub fn record(&self) -> &StationRecord {
        &self.record
    }

    /// Readings in source file order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Shorthand for `self.record().id`.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn into_parts(self) -> (StationRecord, Vec<Reading>) {
        (self.record, self.readings)
    }
}
