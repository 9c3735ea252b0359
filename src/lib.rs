mod coverage;
mod error;
mod hydrocover;
mod metadata;
mod series;
mod stations;
mod types;
mod utils;

pub use error::{HydrocoverError, LoadError};
pub use hydrocover::*;

pub use metadata::loader::{MetadataLoader, REQUIRED_COLUMNS};
pub use series::csv_loader::{CsvSeriesLoader, SeriesLoader, SERIES_COLUMNS};
pub use series::error::SeriesLoadError;
pub use series::joiner::{default_concurrency, JoinOutcome, JoinPolicy, SeriesJoiner};

pub use coverage::analyzer::{
    coverage, filter_by_coverage, sort_by_coverage, CoverageResult, ZERO_SPAN_COVERAGE,
};
pub use coverage::report::{coverage_frame, readings_frame};

pub use stations::locate_station::{bounding_box, BoundingBox, LatLon, StationLocator};

pub use types::format::{DecimalSeparator, MetadataFormat, SeriesFormat};
pub use types::reading::Reading;
pub use types::series::StationSeries;
pub use types::station::{Location, StationRecord};
