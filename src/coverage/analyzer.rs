//! Coverage statistics: how much of a station's date range is backed by a
//! finite discharge value.

use crate::types::series::StationSeries;
use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::borrow::Borrow;

/// Coverage reported for series spanning zero days (empty or single-date series).
pub const ZERO_SPAN_COVERAGE: f64 = 0.0;

/// Derived coverage figures for one [`StationSeries`].
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct CoverageResult {
    /// `observed_count / span_days`, capped at `1.0`; [`ZERO_SPAN_COVERAGE`] when `span_days` is zero.
    pub coverage: f64,
    /// Number of readings with a finite discharge.
    pub observed_count: usize,
    /// Days between the earliest and the latest reading.
    pub span_days: f64,
    /// Earliest reading date, `None` for an empty series.
    pub start: Option<NaiveDate>,
    /// Latest reading date, `None` for an empty series.
    pub end: Option<NaiveDate>,
}

/// Computes the coverage of `series`.
///
/// Readings do not need to be sorted; the earliest and latest dates are found by
/// scanning. Duplicate dates are counted as often as they occur and the ratio
/// is capped at `1.0`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hydrocover::{coverage, Location, Reading, StationRecord, StationSeries};
///
/// let record = StationRecord {
///     id: "S1".into(),
///     river: "Wien".into(),
///     station: "Hütteldorf".into(),
///     location: Location { longitude: 16.3, latitude: 48.2, elevation: 200.0 },
///     catchment: 500.0,
///     source_path: "q_s1.csv".into(),
/// };
/// let day = |d| NaiveDate::from_ymd_opt(2020, 1, d).unwrap();
/// let series = StationSeries::new(
///     record,
///     vec![Reading::new(day(1), 3.1), Reading::missing(day(2)), Reading::new(day(5), 2.9)],
/// );
///
/// let result = coverage(&series);
/// assert_eq!(result.observed_count, 2);
/// assert_eq!(result.span_days, 4.0);
/// assert_eq!(result.coverage, 0.5);
/// ```
pub fn coverage(series: &StationSeries) -> CoverageResult {
    let readings = series.readings();

    let start = readings.iter().map(|r| r.time).min();
    let end = readings.iter().map(|r| r.time).max();
    let observed_count = readings.iter().filter(|r| r.is_observed()).count();

    let span_days = match (start, end) {
        (Some(start), Some(end)) => (end - start).num_days() as f64,
        _ => 0.0,
    };

    let coverage = if span_days > 0.0 {
        (observed_count as f64 / span_days).min(1.0)
    } else {
        ZERO_SPAN_COVERAGE
    };

    CoverageResult {
        coverage,
        observed_count,
        span_days,
        start,
        end,
    }
}

impl StationSeries {
    /// See [`coverage`].
    pub fn coverage(&self) -> CoverageResult {
        coverage(self)
    }
}

/// Keeps the stations whose coverage is strictly below `threshold`, in their original order.
///
/// Works on owned series as well as on references, so calls compose with
/// [`sort_by_coverage`].
pub fn filter_by_coverage<I, S>(series: I, threshold: f64) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: Borrow<StationSeries>,
{
    series
        .into_iter()
        .filter(|s| coverage(s.borrow()).coverage < threshold)
        .collect()
}

/// Orders stations by ascending coverage. Stations with equal coverage keep their relative order.
pub fn sort_by_coverage<I, S>(series: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: Borrow<StationSeries>,
{
    let mut sorted: Vec<S> = series.into_iter().collect();
    sorted.sort_by_cached_key(|s| OrderedFloat(coverage(s.borrow()).coverage));
    sorted
}
