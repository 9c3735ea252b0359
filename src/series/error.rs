use crate::error::LoadError;
use thiserror::Error;

/// A series file failed to load, attributed to the station it belongs to.
#[derive(Debug, Error)]
#[error("Failed to load discharge series for station '{station_id}'")]
pub struct SeriesLoadError {
    pub station_id: String,
    #[source]
    pub cause: LoadError,
}

impl SeriesLoadError {
    pub fn new(station_id: impl Into<String>, cause: LoadError) -> Self {
        Self {
            station_id: station_id.into(),
            cause,
        }
    }
}
