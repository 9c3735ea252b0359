use crate::error::LoadError;
use crate::types::format::{check_separators, SeriesFormat};
use crate::types::reading::Reading;
use crate::utils::{read_string_frame, string_column};
use chrono::NaiveDate;
use log::{debug, warn};
use std::path::Path;

/// Column names assigned to every series file, by position.
pub const SERIES_COLUMNS: [&str; 2] = ["time", "discharge"];

/// Cell contents treated as a missing discharge value.
const MISSING_TOKENS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// Source of a station's readings, keyed by the record's resolved `source_path`.
///
/// Implementations run on tokio's blocking pool, so they may do synchronous I/O.
/// Closures with the matching signature implement this trait as well.
pub trait SeriesLoader: Send + Sync + 'static {
    fn load(&self, path: &Path) -> Result<Vec<Reading>, LoadError>;
}

impl<F> SeriesLoader for F
where
    F: Fn(&Path) -> Result<Vec<Reading>, LoadError> + Send + Sync + 'static,
{
    fn load(&self, path: &Path) -> Result<Vec<Reading>, LoadError> {
        self(path)
    }
}

/// Reads two-column `time,discharge` files.
#[derive(Debug, Clone, Default)]
pub struct CsvSeriesLoader {
    format: SeriesFormat,
}

impl CsvSeriesLoader {
    pub fn new(format: SeriesFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &SeriesFormat {
        &self.format
    }

    fn parse_discharge(&self, raw: Option<&str>) -> Option<f64> {
        let Some(raw) = raw.map(str::trim) else {
            return Some(f64::NAN);
        };
        if MISSING_TOKENS.contains(&raw) {
            return Some(f64::NAN);
        }
        self.format.decimal.parse(raw)
    }
}

impl SeriesLoader for CsvSeriesLoader {
    fn load(&self, path: &Path) -> Result<Vec<Reading>, LoadError> {
        check_separators(self.format.separator, self.format.decimal)
            .map_err(LoadError::InvalidFormat)?;

        let mut df = read_string_frame(path, self.format.has_header, self.format.separator)?;

        if df.width() != SERIES_COLUMNS.len() {
            warn!(
                "Series file {:?} has {} columns, expected {}",
                path,
                df.width(),
                SERIES_COLUMNS.len()
            );
            return Err(LoadError::ColumnCount {
                path: path.to_path_buf(),
                expected: SERIES_COLUMNS.len(),
                found: df.width(),
            });
        }

        df.set_column_names(SERIES_COLUMNS.iter().copied())
            .map_err(|e| LoadError::Csv(path.to_path_buf(), e))?;

        let time = string_column(&df, "time", path)?;
        let discharge = string_column(&df, "discharge", path)?;
        let mut readings = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let parse_error = |column: &str, value: Option<&str>, expected: &'static str| {
                LoadError::Parse {
                    path: path.to_path_buf(),
                    row: idx + 1,
                    column: column.to_string(),
                    value: value.unwrap_or_default().to_string(),
                    expected,
                }
            };

            let raw_time = time.get(idx);
            let date = raw_time
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), &self.format.date_format).ok())
                .ok_or_else(|| parse_error("time", raw_time, "date"))?;

            let raw_discharge = discharge.get(idx);
            let value = self
                .parse_discharge(raw_discharge)
                .ok_or_else(|| parse_error("discharge", raw_discharge, "decimal number"))?;

            readings.push(Reading::new(date, value));
        }

        debug!("Read {} readings from {:?}", readings.len(), path);
        Ok(readings)
    }
}
