//! Pairs every station record with the readings loaded from its series file.
//!
//! Loads run concurrently on tokio's blocking pool, bounded by a configurable
//! limit. Completion order does not matter: each result is stored in the slot
//! of the record it belongs to, so the output follows the input order.

use crate::error::LoadError;
use crate::series::csv_loader::SeriesLoader;
use crate::series::error::SeriesLoadError;
use crate::types::reading::Reading;
use crate::types::series::StationSeries;
use crate::types::station::StationRecord;
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

/// What to do when a station's series fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinPolicy {
    /// Abort the join and return the first failure.
    #[default]
    FailFast,
    /// Keep going; failed stations are reported in [`JoinOutcome::failures`].
    CollectAll,
}

/// Result of a join.
#[derive(Debug, Default)]
pub struct JoinOutcome {
    /// Successfully joined stations, in input order.
    pub series: Vec<StationSeries>,
    /// Stations whose series could not be loaded, in input order.
    /// Always empty under [`JoinPolicy::FailFast`].
    pub failures: Vec<SeriesLoadError>,
}

impl JoinOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Number of loads allowed in flight when no limit is configured.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

pub struct SeriesJoiner<L: SeriesLoader> {
    loader: Arc<L>,
    concurrency: usize,
    timeout: Option<Duration>,
    policy: JoinPolicy,
}

impl<L: SeriesLoader> SeriesJoiner<L> {
    pub fn new(loader: L) -> Self {
        Self::from_arc(Arc::new(loader))
    }

    pub fn from_arc(loader: Arc<L>) -> Self {
        Self {
            loader,
            concurrency: default_concurrency(),
            timeout: None,
            policy: JoinPolicy::default(),
        }
    }

    /// Caps the number of concurrent loads. Values below one are treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Gives up on a single file after `timeout`. The abandoned load still runs to
    /// completion on the blocking pool, but its result is discarded.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_policy(mut self, policy: JoinPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    /// Loads the series of every record exactly once and pairs it with its record.
    ///
    /// # Errors
    ///
    /// Under [`JoinPolicy::FailFast`] the first failing load is returned as a
    /// [`SeriesLoadError`] naming the station. Under [`JoinPolicy::CollectAll`]
    /// this never fails; failures are listed in the returned [`JoinOutcome`].
    pub async fn join(
        &self,
        records: impl IntoIterator<Item = StationRecord>,
    ) -> Result<JoinOutcome, SeriesLoadError> {
        let records: Vec<StationRecord> = records.into_iter().collect();
        let mut slots: Vec<Option<Result<Vec<Reading>, LoadError>>> =
            (0..records.len()).map(|_| None).collect();

        info!(
            "Joining {} stations with up to {} concurrent loads",
            records.len(),
            self.concurrency
        );

        {
            let mut loads = stream::iter(records.iter().enumerate())
                .map(|(idx, record)| {
                    let loader = Arc::clone(&self.loader);
                    let path = record.source_path.clone();
                    let timeout = self.timeout;
                    async move { (idx, Self::load_one(loader, path, timeout).await) }
                })
                .buffer_unordered(self.concurrency);

            while let Some((idx, result)) = loads.next().await {
                match result {
                    Err(cause) if self.policy == JoinPolicy::FailFast => {
                        warn!(
                            "Aborting join, series for station {} failed: {}",
                            records[idx].id, cause
                        );
                        return Err(SeriesLoadError::new(records[idx].id.clone(), cause));
                    }
                    other => slots[idx] = Some(other),
                }
            }
        }

        let mut outcome = JoinOutcome::default();
        for (record, slot) in records.into_iter().zip(slots) {
            let Some(result) = slot else {
                continue;
            };
            match result {
                Ok(readings) => {
                    debug!("Joined {} readings for station {}", readings.len(), record.id);
                    outcome.series.push(StationSeries::new(record, readings));
                }
                Err(cause) => {
                    warn!("Skipping station {}: {}", record.id, cause);
                    outcome.failures.push(SeriesLoadError::new(record.id, cause));
                }
            }
        }

        info!(
            "Joined {} stations, {} failed",
            outcome.series.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn load_one(
        loader: Arc<L>,
        path: PathBuf,
        timeout: Option<Duration>,
    ) -> Result<Vec<Reading>, LoadError> {
        let task_path = path.clone();
        let handle = task::spawn_blocking(move || loader.load(&task_path));

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined?,
                Err(_) => Err(LoadError::Timeout(path, limit)),
            },
            None => handle.await?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::station::Location;
    use chrono::NaiveDate;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(id: &str) -> StationRecord {
        StationRecord {
            id: id.to_string(),
            river: "Wien".to_string(),
            station: format!("Station {id}"),
            location: Location {
                longitude: 16.3,
                latitude: 48.2,
                elevation: 200.0,
            },
            catchment: 500.0,
            source_path: PathBuf::from(format!("{id}.csv")),
        }
    }

    fn readings(n: usize) -> Vec<Reading> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| Reading::new(start + chrono::Days::new(i as u64), i as f64))
            .collect()
    }

    /// Loader whose latency shrinks with the index encoded in the file name, so
    /// later stations finish first.
    fn reversed_latency_loader(
        path: &Path,
    ) -> Result<Vec<Reading>, LoadError> {
        let idx: u64 = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.trim_start_matches('S').parse().ok())
            .unwrap_or(0);
        std::thread::sleep(Duration::from_millis(60u64.saturating_sub(idx * 10)));
        Ok(readings(idx as usize + 1))
    }

    #[tokio::test]
    async fn test_output_order_matches_input_order() -> Result<(), SeriesLoadError> {
        let records: Vec<_> = (0..6).map(|i| record(&format!("S{i}"))).collect();
        let joiner = SeriesJoiner::new(reversed_latency_loader).with_concurrency(6);

        let outcome = joiner.join(records).await?;

        let ids: Vec<_> = outcome.series.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["S0", "S1", "S2", "S3", "S4", "S5"]);
        for (i, series) in outcome.series.iter().enumerate() {
            assert_eq!(series.len(), i + 1);
        }
        assert!(outcome.is_complete());
        Ok(())
    }

    #[tokio::test]
    async fn test_loader_called_once_per_record() -> Result<(), SeriesLoadError> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = move |_: &Path| -> Result<Vec<Reading>, LoadError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(readings(3))
        };
        let records: Vec<_> = (0..25).map(|i| record(&format!("S{i}"))).collect();

        let outcome = SeriesJoiner::new(loader)
            .with_concurrency(4)
            .join(records)
            .await?;

        assert_eq!(outcome.series.len(), 25);
        assert_eq!(calls.load(Ordering::SeqCst), 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_input() -> Result<(), SeriesLoadError> {
        let outcome = SeriesJoiner::new(reversed_latency_loader)
            .join(Vec::new())
            .await?;
        assert!(outcome.series.is_empty());
        assert!(outcome.failures.is_empty());
        Ok(())
    }

    fn failing_loader(path: &Path) -> Result<Vec<Reading>, LoadError> {
        if path == Path::new("BAD.csv") {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Ok(readings(2))
    }

    #[tokio::test]
    async fn test_fail_fast_names_station() {
        let records = vec![record("A"), record("BAD"), record("C")];

        let err = SeriesJoiner::new(failing_loader)
            .join(records)
            .await
            .unwrap_err();

        assert_eq!(err.station_id, "BAD");
        assert!(matches!(err.cause, LoadError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_collect_all_returns_partial_results() -> Result<(), SeriesLoadError> {
        let records = vec![record("A"), record("BAD"), record("C")];

        let outcome = SeriesJoiner::new(failing_loader)
            .with_policy(JoinPolicy::CollectAll)
            .join(records)
            .await?;

        let ids: Vec<_> = outcome.series.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].station_id, "BAD");
        assert!(!outcome.is_complete());
        Ok(())
    }

    #[tokio::test]
    async fn test_timeout_is_a_series_load_error() {
        let slow = |_: &Path| -> Result<Vec<Reading>, LoadError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(readings(1))
        };

        let err = SeriesJoiner::new(slow)
            .with_timeout(Duration::from_millis(20))
            .join(vec![record("SLOW")])
            .await
            .unwrap_err();

        assert_eq!(err.station_id, "SLOW");
        assert!(matches!(err.cause, LoadError::Timeout(_, _)));
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let joiner = SeriesJoiner::new(failing_loader).with_concurrency(0);
        assert_eq!(joiner.concurrency(), 1);
        assert!(default_concurrency() >= 1);
        assert_eq!(joiner.policy(), JoinPolicy::FailFast);
    }
}
