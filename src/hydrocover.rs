//! This module provides the main entry point of the crate: a configured client
//! that loads station metadata, joins each station with its discharge series
//! and hands the result to the coverage analysis.

use crate::error::{HydrocoverError, LoadError};
use crate::metadata::loader::MetadataLoader;
use crate::series::csv_loader::CsvSeriesLoader;
use crate::series::joiner::{JoinOutcome, JoinPolicy, SeriesJoiner};
use crate::types::format::{MetadataFormat, SeriesFormat};
use crate::types::station::StationRecord;
use bon::bon;
use std::path::Path;
use std::time::Duration;
use tokio::task;

/// The main client struct.
///
/// Holds the file formats and join settings for one analysis run. Create it with
/// [`Hydrocover::builder()`]; every setting is optional.
///
/// # Examples
///
/// ```rust
/// # use hydrocover::{Hydrocover, HydrocoverError, JoinPolicy, MetadataFormat};
/// # use std::time::Duration;
/// let client = Hydrocover::builder()
///     .metadata_format(MetadataFormat::default())
///     .concurrency(8)
///     .timeout(Duration::from_secs(30))
///     .policy(JoinPolicy::CollectAll)
///     .build();
/// ```
pub struct Hydrocover {
    metadata_loader: MetadataLoader,
    joiner: SeriesJoiner<CsvSeriesLoader>,
}

#[bon]
impl Hydrocover {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `.metadata_format(MetadataFormat)`: Optional. Layout of the station metadata file. Defaults to `;`-separated with decimal commas.
    /// * `.series_format(SeriesFormat)`: Optional. Layout of the per-station series files. Defaults to `time,discharge` with decimal periods.
    /// * `.concurrency(usize)`: Optional. Maximum number of series files read at once. Defaults to the number of available cores.
    /// * `.timeout(Duration)`: Optional. Per-file load timeout. No timeout by default.
    /// * `.policy(JoinPolicy)`: Optional. Defaults to [`JoinPolicy::FailFast`].
    #[builder]
    pub fn new(
        metadata_format: Option<MetadataFormat>,
        series_format: Option<SeriesFormat>,
        concurrency: Option<usize>,
        timeout: Option<Duration>,
        policy: Option<JoinPolicy>,
    ) -> Self {
        let mut joiner = SeriesJoiner::new(CsvSeriesLoader::new(series_format.unwrap_or_default()))
            .with_policy(policy.unwrap_or_default());
        if let Some(concurrency) = concurrency {
            joiner = joiner.with_concurrency(concurrency);
        }
        if let Some(timeout) = timeout {
            joiner = joiner.with_timeout(timeout);
        }

        Self {
            metadata_loader: MetadataLoader::new(metadata_format.unwrap_or_default()),
            joiner,
        }
    }

    /// Reads the station metadata file on the blocking pool.
    ///
    /// Series paths are resolved against `base_dir`. See [`MetadataLoader::load`]
    /// for the possible errors.
    pub async fn load_stations(
        &self,
        path: &Path,
        base_dir: &Path,
    ) -> Result<Vec<StationRecord>, HydrocoverError> {
        let loader = self.metadata_loader.clone();
        let path = path.to_path_buf();
        let base_dir = base_dir.to_path_buf();

        let records = task::spawn_blocking(move || loader.load(&path, &base_dir))
            .await
            .map_err(LoadError::from)??;
        Ok(records)
    }

    /// Joins `records` with their series files using the configured policy.
    pub async fn join(
        &self,
        records: Vec<StationRecord>,
    ) -> Result<JoinOutcome, HydrocoverError> {
        Ok(self.joiner.join(records).await?)
    }

    /// Loads the metadata file and joins every station with its series.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.metadata(&Path)`: **Required.** Path of the station metadata file.
    /// * `.base_dir(&Path)`: Optional. Directory the `filename` column is relative to. Defaults to the metadata file's directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use hydrocover::{coverage, sort_by_coverage, Hydrocover, HydrocoverError};
    /// # use std::path::Path;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), HydrocoverError> {
    /// let client = Hydrocover::builder().build();
    /// let outcome = client
    ///     .load()
    ///     .metadata(Path::new("data/stations.csv"))
    ///     .call()
    ///     .await?;
    ///
    /// for series in sort_by_coverage(&outcome.series) {
    ///     println!("{}: {:.1}%", series.id(), coverage(series).coverage * 100.0);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn load(
        &self,
        metadata: &Path,
        base_dir: Option<&Path>,
    ) -> Result<JoinOutcome, HydrocoverError> {
        let base_dir = base_dir
            .or_else(|| metadata.parent())
            .unwrap_or_else(|| Path::new("."));
        let records = self.load_stations(metadata, base_dir).await?;
        self.join(records).await
    }
}

impl Default for Hydrocover {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::analyzer::{coverage, filter_by_coverage};
    use std::fs;
    use tempfile::TempDir;

    const METADATA: &str = "filename;id;river;station;lon;lat;z;catchment\n\
                            q_s1.csv;S1;Wien;Hütteldorf;16,3;48,2;200;500\n\
                            q_s2.csv;S2;Donau;Korneuburg;16,33;48,35;160;101537\n";

    fn write_fixture(dir: &TempDir) {
        fs::write(dir.path().join("stations.csv"), METADATA).unwrap();

        let mut s1 = String::from("time,discharge\n");
        for d in 1..=11 {
            let value = if [3, 6, 9].contains(&d) {
                "NA".to_string()
            } else {
                format!("{}.5", d)
            };
            s1.push_str(&format!("2020-01-{:02},{}\n", d, value));
        }
        fs::write(dir.path().join("q_s1.csv"), s1).unwrap();

        fs::write(
            dir.path().join("q_s2.csv"),
            "time,discharge\n2020-01-01,1900\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_load_joins_metadata_and_series() -> Result<(), HydrocoverError> {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        let client = Hydrocover::default();

        let outcome = client
            .load()
            .metadata(&dir.path().join("stations.csv"))
            .call()
            .await?;

        assert!(outcome.is_complete());
        assert_eq!(outcome.series.len(), 2);

        let s1 = &outcome.series[0];
        assert_eq!(s1.id(), "S1");
        assert_eq!(s1.record().catchment, 500.0);
        assert_eq!(s1.len(), 11);
        assert!((coverage(s1).coverage - 0.8).abs() < 1e-12);

        let s2 = &outcome.series[1];
        assert_eq!(coverage(s2).span_days, 0.0);
        assert_eq!(coverage(s2).coverage, 0.0);

        let sparse = filter_by_coverage(&outcome.series, 0.5);
        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse[0].id(), "S2");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_series_file_fails_fast() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        fs::remove_file(dir.path().join("q_s2.csv")).unwrap();
        let client = Hydrocover::default();

        let err = client
            .load()
            .metadata(&dir.path().join("stations.csv"))
            .call()
            .await
            .unwrap_err();

        match err {
            HydrocoverError::SeriesLoad(e) => {
                assert_eq!(e.station_id, "S2");
                assert!(matches!(e.cause, LoadError::NotFound(_)));
            }
            other => panic!("Expected series load error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_collect_all_with_explicit_base_dir() -> Result<(), HydrocoverError> {
        let dir = TempDir::new().unwrap();
        let series_dir = dir.path().join("series");
        fs::create_dir(&series_dir).unwrap();
        fs::write(dir.path().join("stations.csv"), METADATA).unwrap();
        fs::write(
            series_dir.join("q_s1.csv"),
            "time,discharge\n2020-01-01,1\n2020-01-03,2\n",
        )
        .unwrap();

        let client = Hydrocover::builder()
            .policy(JoinPolicy::CollectAll)
            .concurrency(1)
            .build();

        let outcome = client
            .load()
            .metadata(&dir.path().join("stations.csv"))
            .base_dir(&series_dir)
            .call()
            .await?;

        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.series[0].id(), "S1");
        assert_eq!(coverage(&outcome.series[0]).coverage, 1.0);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].station_id, "S2");
        Ok(())
    }

    #[tokio::test]
    async fn test_schema_mismatch_surfaces_as_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stations.csv");
        fs::write(&path, "filename;id;river;station;lon;lat;z\n").unwrap();

        let err = Hydrocover::default()
            .load_stations(&path, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, HydrocoverError::Load(ref e) if e.is_schema_mismatch()));
    }
}
