use crate::series::error::SeriesLoadError;
use polars::error::PolarsError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures while reading a metadata or series file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: '{0}'")]
    NotFound(PathBuf),

    #[error("I/O error accessing '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Missing required column '{column}' in '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Column count ({found}) does not match schema length ({expected}) in '{path}'")]
    ColumnCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// A data row whose field count differs from the header, or from the first
    /// row of a headerless file. `row` counts data rows from 1.
    #[error("Row {row} of '{path}' has {found} fields, expected {expected}")]
    RaggedRow {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// `row` counts data rows from 1, excluding any header.
    #[error("Cannot parse value '{value}' in row {row}, column '{column}' of '{path}' as {expected}")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("Duplicate station id '{id}' in row {row} of '{path}'")]
    DuplicateId {
        path: PathBuf,
        row: usize,
        id: String,
    },

    #[error("Coordinate {value} in row {row}, column '{column}' of '{path}' is out of range")]
    InvalidCoordinate {
        path: PathBuf,
        row: usize,
        column: String,
        value: f64,
    },

    #[error("Invalid format configuration: {0}")]
    InvalidFormat(String),

    #[error("Failed reading CSV data from '{0}'")]
    Csv(PathBuf, #[source] PolarsError),

    #[error("Loading '{0}' did not finish within {1:?}")]
    Timeout(PathBuf, Duration),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl LoadError {
    /// True for structural problems: a required column is absent, the column
    /// count is wrong, or a row has more or fewer fields than the header.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            LoadError::MissingColumn { .. }
                | LoadError::ColumnCount { .. }
                | LoadError::RaggedRow { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum HydrocoverError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    SeriesLoad(#[from] SeriesLoadError),

    #[error("Failed building DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
