use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One discharge observation of a station series.
///
/// Missing values are stored as `f64::NAN`; infinite values are kept as read
/// and count as missing as well.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Calendar day of the observation.
    pub time: NaiveDate,
    /// Discharge in m³/s, `NaN` when missing.
    pub discharge: f64,
}

impl Reading {
    pub fn new(time: NaiveDate, discharge: f64) -> Self {
        Self { time, discharge }
    }

    /// Creates a reading with no discharge value.
    pub fn missing(time: NaiveDate) -> Self {
        Self {
            time,
            discharge: f64::NAN,
        }
    }

    /// Whether this reading holds a finite discharge value.
    pub fn is_observed(&self) -> bool {
        self.discharge.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_observed() {
        let day = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        assert!(Reading::new(day, 12.5).is_observed());
        assert!(Reading::new(day, 0.0).is_observed());
        assert!(!Reading::missing(day).is_observed());
        assert!(!Reading::new(day, f64::INFINITY).is_observed());
        assert!(!Reading::new(day, f64::NEG_INFINITY).is_observed());
    }
}
