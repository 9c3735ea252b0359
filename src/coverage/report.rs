//! Tabular views for plotting and mapping consumers.

use crate::types::series::StationSeries;
use chrono::NaiveDate;
use polars::prelude::{DataFrame, PolarsResult};
use std::borrow::Borrow;

/// One row per station: metadata, location and its coverage figures.
///
/// Columns: `id`, `river`, `station`, `lon`, `lat`, `z`, `catchment`,
/// `observed`, `span_days`, `coverage`, `start`, `end`.
pub fn coverage_frame<I, S>(series: I) -> PolarsResult<DataFrame>
where
    I: IntoIterator<Item = S>,
    S: Borrow<StationSeries>,
{
    let mut ids = Vec::new();
    let mut rivers = Vec::new();
    let mut stations = Vec::new();
    let mut lon = Vec::new();
    let mut lat = Vec::new();
    let mut z = Vec::new();
    let mut catchment = Vec::new();
    let mut observed: Vec<u64> = Vec::new();
    let mut span_days = Vec::new();
    let mut coverage = Vec::new();
    let mut start: Vec<Option<NaiveDate>> = Vec::new();
    let mut end: Vec<Option<NaiveDate>> = Vec::new();

    for item in series {
        let series = item.borrow();
        let record = series.record();
        let result = series.coverage();

        ids.push(record.id.clone());
        rivers.push(record.river.clone());
        stations.push(record.station.clone());
        lon.push(record.location.longitude);
        lat.push(record.location.latitude);
        z.push(record.location.elevation);
        catchment.push(record.catchment);
        observed.push(result.observed_count as u64);
        span_days.push(result.span_days);
        coverage.push(result.coverage);
        start.push(result.start);
        end.push(result.end);
    }

    polars::df!(
        "id" => ids,
        "river" => rivers,
        "station" => stations,
        "lon" => lon,
        "lat" => lat,
        "z" => z,
        "catchment" => catchment,
        "observed" => observed,
        "span_days" => span_days,
        "coverage" => coverage,
        "start" => start,
        "end" => end
    )
}

/// A station's readings as `time` (Date) and `discharge` (Float64) columns.
/// Non-finite discharge values become nulls.
pub fn readings_frame(series: &StationSeries) -> PolarsResult<DataFrame> {
    let time: Vec<NaiveDate> = series.readings().iter().map(|r| r.time).collect();
    let discharge: Vec<Option<f64>> = series
        .readings()
        .iter()
        .map(|r| r.is_observed().then_some(r.discharge))
        .collect();

    polars::df!(
        "time" => time,
        "discharge" => discharge
    )
}
