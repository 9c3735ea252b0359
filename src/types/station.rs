//! Defines the data structures representing gauging stations and their metadata,
//! including location and the resolved path of their discharge series. Also includes
//! implementations necessary for spatial indexing using the `rstar` crate.

use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents a single gauging station as described by one row of the metadata file.
///
/// Records are produced by [`crate::MetadataLoader`] and never modified afterwards.
/// The `id` is unique within one metadata file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    /// The unique station identifier (e.g., "212670").
    pub id: String,
    /// Name of the river the station is located on.
    pub river: String,
    /// Name of the gauging station.
    pub station: String,
    /// Geographical location details (longitude, latitude, elevation).
    pub location: Location,
    /// Catchment area upstream of the station in km².
    pub catchment: f64,
    /// Location of the station's discharge series, resolved against the caller's base directory.
    pub source_path: PathBuf,
}

/// Represents the geographical location of a gauging station.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Elevation above sea level in meters.
    pub elevation: f64,
}

// --- R-Tree Implementations ---

/// Lets a `StationRecord` live in an R-Tree keyed by `[latitude, longitude]`.
impl RTreeObject for StationRecord {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.latitude, self.location.longitude])
    }
}

impl PointDistance for StationRecord {
    /// Squared Euclidean distance in degree space between the station and `[lat, lon]`.
    ///
    /// Only used to order candidates inside the tree; real distances are computed
    /// with the haversine formula by [`crate::StationLocator`].
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.location.latitude - point[0];
        let dy = self.location.longitude - point[1];
        dx * dx + dy * dy
    }
}
