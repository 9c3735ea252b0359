//! Parses the station metadata file into [`StationRecord`]s.
//!
//! The file is read with every column as text and each required field is then
//! converted against a fixed schema, so that a bad cell is reported with its
//! row and column instead of silently changing a column's type.

use crate::error::LoadError;
use crate::types::format::{check_separators, MetadataFormat};
use crate::types::station::{Location, StationRecord};
use crate::utils::{read_string_frame, string_column};
use log::{debug, info, warn};
use polars::prelude::StringChunked;
use std::collections::HashSet;
use std::path::Path;

/// Columns every metadata file must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "filename",
    "id",
    "river",
    "station",
    "lon",
    "lat",
    "z",
    "catchment",
];

/// Loads station metadata with an explicit [`MetadataFormat`].
#[derive(Debug, Clone, Default)]
pub struct MetadataLoader {
    format: MetadataFormat,
}

impl MetadataLoader {
    pub fn new(format: MetadataFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &MetadataFormat {
        &self.format
    }

    /// Reads the metadata file at `path`, one [`StationRecord`] per data row in file order.
    ///
    /// Each record's `filename` is joined onto `base_dir` to form its `source_path`;
    /// the referenced series files are not opened.
    ///
    /// # Errors
    ///
    /// * [`LoadError::NotFound`] if `path` does not exist.
    /// * [`LoadError::MissingColumn`] if one of [`REQUIRED_COLUMNS`] is absent.
    /// * [`LoadError::RaggedRow`] if a row has more or fewer fields than the header.
    /// * [`LoadError::Parse`] if `id` or `filename` is empty.
    /// * [`LoadError::Parse`] if a numeric field cannot be converted.
    /// * [`LoadError::InvalidCoordinate`] for a longitude or latitude out of range.
    /// * [`LoadError::DuplicateId`] if an `id` occurs twice.
    pub fn load(&self, path: &Path, base_dir: &Path) -> Result<Vec<StationRecord>, LoadError> {
        check_separators(self.format.separator, self.format.decimal)
            .map_err(LoadError::InvalidFormat)?;

        let df = read_string_frame(path, true, self.format.separator)?;

        let columns = match RequiredColumns::resolve(&df, path) {
            Ok(columns) => columns,
            Err(e) => {
                warn!("Metadata file {:?} does not match the station schema: {}", path, e);
                return Err(e);
            }
        };

        let mut seen_ids = HashSet::with_capacity(df.height());
        let mut records = Vec::with_capacity(df.height());

        for idx in 0..df.height() {
            let row = RowParser {
                path,
                row: idx + 1,
                idx,
                format: &self.format,
            };

            let id = row.text(columns.id, "id")?;
            if !seen_ids.insert(id.clone()) {
                return Err(LoadError::DuplicateId {
                    path: path.to_path_buf(),
                    row: row.row,
                    id,
                });
            }

            let longitude = row.coordinate(columns.lon, "lon", 180.0)?;
            let latitude = row.coordinate(columns.lat, "lat", 90.0)?;
            let filename = row.text(columns.filename, "filename")?;

            records.push(StationRecord {
                id,
                river: row.label(columns.river),
                station: row.label(columns.station),
                location: Location {
                    longitude,
                    latitude,
                    elevation: row.decimal(columns.z, "z")?,
                },
                catchment: row.decimal(columns.catchment, "catchment")?,
                source_path: base_dir.join(filename),
            });
        }

        info!("Loaded {} station records from {:?}", records.len(), path);
        debug!("Series paths resolved against {:?}", base_dir);
        Ok(records)
    }
}

struct RequiredColumns<'a> {
    filename: &'a StringChunked,
    id: &'a StringChunked,
    river: &'a StringChunked,
    station: &'a StringChunked,
    lon: &'a StringChunked,
    lat: &'a StringChunked,
    z: &'a StringChunked,
    catchment: &'a StringChunked,
}

impl<'a> RequiredColumns<'a> {
    fn resolve(df: &'a polars::frame::DataFrame, path: &Path) -> Result<Self, LoadError> {
        let [filename, id, river, station, lon, lat, z, catchment] =
            REQUIRED_COLUMNS.map(|name| string_column(df, name, path));
        Ok(Self {
            filename: filename?,
            id: id?,
            river: river?,
            station: station?,
            lon: lon?,
            lat: lat?,
            z: z?,
            catchment: catchment?,
        })
    }
}

/// Converts the cells of one data row. `row` is 1-based and excludes the header.
struct RowParser<'a> {
    path: &'a Path,
    row: usize,
    idx: usize,
    format: &'a MetadataFormat,
}

impl RowParser<'_> {
    fn parse_error(&self, column: &str, value: &str, expected: &'static str) -> LoadError {
        LoadError::Parse {
            path: self.path.to_path_buf(),
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    fn text(&self, ca: &StringChunked, column: &str) -> Result<String, LoadError> {
        match ca.get(self.idx) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(self.parse_error(column, "", "non-empty text")),
        }
    }

    /// Free-form name; an empty cell is an empty name.
    fn label(&self, ca: &StringChunked) -> String {
        ca.get(self.idx).map(str::trim).unwrap_or_default().to_string()
    }

    fn decimal(&self, ca: &StringChunked, column: &str) -> Result<f64, LoadError> {
        let raw = ca.get(self.idx).unwrap_or("");
        self.format
            .decimal
            .parse(raw)
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.parse_error(column, raw, "decimal number"))
    }

    fn coordinate(&self, ca: &StringChunked, column: &str, limit: f64) -> Result<f64, LoadError> {
        let value = self.decimal(ca, column)?;
        if !(-limit..=limit).contains(&value) {
            return Err(LoadError::InvalidCoordinate {
                path: self.path.to_path_buf(),
                row: self.row,
                column: column.to_string(),
                value,
            });
        }
        Ok(value)
    }
}
