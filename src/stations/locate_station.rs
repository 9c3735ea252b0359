use crate::types::station::StationRecord;
use haversine::{distance, Location as HaversineLocation, Units};
use rstar::RTree;
use serde::Serialize;
use std::cmp::Ordering;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use hydrocover::LatLon;
///
/// let vienna = LatLon(48.2082, 16.3738);
/// assert_eq!(vienna.0, 48.2082); // Latitude
/// assert_eq!(vienna.1, 16.3738); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Geographic extent of a set of stations, in decimal degrees.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Grows the box by `margin` degrees on every side, clamped to valid coordinates.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_lon: (self.min_lon - margin).max(-180.0),
            min_lat: (self.min_lat - margin).max(-90.0),
            max_lon: (self.max_lon + margin).min(180.0),
            max_lat: (self.max_lat + margin).min(90.0),
        }
    }

    pub fn contains(&self, point: LatLon) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.0)
            && (self.min_lon..=self.max_lon).contains(&point.1)
    }
}

/// Smallest box enclosing every station, or `None` when there are no stations.
pub fn bounding_box<'a>(stations: impl IntoIterator<Item = &'a StationRecord>) -> Option<BoundingBox> {
    stations.into_iter().fold(None, |acc, station| {
        let lon = station.location.longitude;
        let lat = station.location.latitude;
        Some(match acc {
            None => BoundingBox {
                min_lon: lon,
                min_lat: lat,
                max_lon: lon,
                max_lat: lat,
            },
            Some(bbox) => BoundingBox {
                min_lon: bbox.min_lon.min(lon),
                min_lat: bbox.min_lat.min(lat),
                max_lon: bbox.max_lon.max(lon),
                max_lat: bbox.max_lat.max(lat),
            },
        })
    })
}

/// Spatial index over station records.
#[derive(Debug, Clone)]
pub struct StationLocator {
    rtree: RTree<StationRecord>,
}

impl StationLocator {
    pub fn new(stations: Vec<StationRecord>) -> Self {
        Self {
            rtree: RTree::bulk_load(stations),
        }
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// Bounding box of all indexed stations, grown by `margin` degrees.
    pub fn bounding_box(&self, margin: f64) -> Option<BoundingBox> {
        bounding_box(self.rtree.iter()).map(|bbox| bbox.expand(margin))
    }

    /// Finds up to `n_results` stations within `max_distance_km` of `location`,
    /// closest first, paired with their great-circle distance in kilometres.
    pub fn query(
        &self,
        location: LatLon,
        n_results: usize,
        max_distance_km: f64,
    ) -> Vec<(StationRecord, f64)> {
        if n_results == 0 {
            return vec![];
        }

        let query_point = [location.0, location.1];

        // Degree-space order only approximates great-circle order, so look at
        // more candidates than requested before filtering and re-sorting.
        let candidate_limit = (n_results * 2).max(20);

        let mut stations_with_dist: Vec<(StationRecord, f64)> = self
            .rtree
            .nearest_neighbor_iter(&query_point)
            .take(candidate_limit)
            .filter_map(|station| {
                let dist_km = distance(
                    HaversineLocation {
                        latitude: location.0,
                        longitude: location.1,
                    },
                    HaversineLocation {
                        latitude: station.location.latitude,
                        longitude: station.location.longitude,
                    },
                    Units::Kilometers,
                );
                (dist_km <= max_distance_km).then(|| (station.to_owned(), dist_km))
            })
            .collect();

        stations_with_dist.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        stations_with_dist.truncate(n_results);
        stations_with_dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::station::Location;
    use std::path::PathBuf;

    fn station(id: &str, latitude: f64, longitude: f64) -> StationRecord {
        StationRecord {
            id: id.to_string(),
            river: "Donau".to_string(),
            station: id.to_string(),
            location: Location {
                longitude,
                latitude,
                elevation: 200.0,
            },
            catchment: 1000.0,
            source_path: PathBuf::from(format!("{id}.csv")),
        }
    }

    fn locator() -> StationLocator {
        StationLocator::new(vec![
            station("Linz", 48.306, 14.286),
            station("Wien", 48.208, 16.373),
            station("Krems", 48.410, 15.603),
            station("Graz", 47.070, 15.439),
            station("Salzburg", 47.809, 13.055),
        ])
    }

    fn validate_results(results: &[(StationRecord, f64)], expected_max_len: usize, max_distance_km: f64) {
        assert!(
            results.len() <= expected_max_len,
            "Expected max {} results, got {}",
            expected_max_len,
            results.len()
        );
        let mut last_dist = -1.0;
        for (station, dist) in results {
            assert!(
                *dist <= max_distance_km + 1e-9,
                "{} distance {} > max {}",
                station.id,
                dist,
                max_distance_km
            );
            assert!(*dist >= last_dist, "{} out of order", station.id);
            last_dist = *dist;
        }
    }

    #[test]
    fn test_query_sorted_by_distance() {
        let locator = locator();

        let results = locator.query(LatLon(48.2, 16.4), 3, 200.0);

        validate_results(&results, 3, 200.0);
        let ids: Vec<_> = results.iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(ids, vec!["Wien", "Krems", "Graz"]);
    }

    #[test]
    fn test_query_respects_radius() {
        let locator = locator();

        let results = locator.query(LatLon(48.2, 16.4), 5, 10.0);

        validate_results(&results, 5, 10.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, "Wien");
    }

    #[test]
    fn test_query_zero_results() {
        assert!(locator().query(LatLon(48.2, 16.4), 0, 1000.0).is_empty());
    }

    #[test]
    fn test_bounding_box_with_margin() {
        let locator = locator();

        let bbox = locator.bounding_box(0.5).expect("Expected a bounding box");

        assert!((bbox.min_lon - 12.555).abs() < 1e-9);
        assert!((bbox.max_lon - 16.873).abs() < 1e-9);
        assert!((bbox.min_lat - 46.570).abs() < 1e-9);
        assert!((bbox.max_lat - 48.910).abs() < 1e-9);
        assert!(bbox.contains(LatLon(48.208, 16.373)));
        assert!(!bbox.contains(LatLon(52.52, 13.40)));
    }

    #[test]
    fn test_bounding_box_empty_and_clamped() {
        assert!(StationLocator::new(vec![]).bounding_box(1.0).is_none());
        assert!(StationLocator::new(vec![]).is_empty());

        let edge = [station("Pole", 89.5, 179.8)];
        let bbox = bounding_box(&edge).unwrap().expand(1.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!(bbox.max_lon, 180.0);
        assert_eq!(bbox.min_lat, 88.5);
    }
}
