use std::path::PathBuf;

use trip_stats_lib::{
    statistics::TripStatistics,
    stop_detection::{StopDetectionConfig, StopHeuristic},
    trip::Trip,
    trip_point::TripPoint,
};

use crate::{gpx_util, trip_log, DataManagerError, DATA_DIR};

#[derive(Clone)]
pub struct DataManager {
    data_dir: PathBuf,
    config: StopDetectionConfig,
}

/// The public interface for loading trips and deriving their statistics.
impl DataManager {
    /// Uses the data directory under the project root.
    pub fn start() -> Result<Self, DataManagerError> {
        let root = project_root::get_project_root().map_err(|source| DataManagerError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self::with_data_dir(root.join(DATA_DIR)))
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            config: StopDetectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StopDetectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Relative names are looked up in the data directory, absolute paths are used as is.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    /// Reads a trip, as GPX for `.gpx` files and as a CSV trip log otherwise.
    pub fn load_trip(&self, filename: &str) -> Result<Trip, DataManagerError> {
        let path = self.resolve(filename);
        let is_gpx = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"));

        let trip = if is_gpx {
            gpx_util::read_gpx(&path)?
        } else {
            trip_log::read_trip_log(&path)?
        };

        tracing::info!("Loaded {} points from {:?}", trip.len(), path);
        if !trip.is_chronological() {
            tracing::warn!("Trip {:?} has points out of time order, statistics may be off", path);
        }

        Ok(trip)
    }

    pub fn trip_statistics(&self, filename: &str, heuristic: StopHeuristic) -> Result<TripStatistics, DataManagerError> {
        let trip = self.load_trip(filename)?;
        let stats = TripStatistics::compute(&trip, heuristic, &self.config)?;

        tracing::info!(
            "{}: {:.2} km in {:.2} h, {} stops",
            heuristic,
            stats.total_distance_km,
            stats.total_time_hours,
            stats.num_stops
        );

        Ok(stats)
    }

    /// Statistics for every heuristic, computed over the same loaded trip.
    pub fn compare_heuristics(&self, filename: &str) -> Result<Vec<TripStatistics>, DataManagerError> {
        let trip = self.load_trip(filename)?;
        StopHeuristic::ALL
            .into_iter()
            .map(|heuristic| TripStatistics::compute(&trip, heuristic, &self.config).map_err(DataManagerError::from))
            .collect()
    }

    pub fn moving_trip(&self, filename: &str, heuristic: StopHeuristic) -> Result<Vec<TripPoint>, DataManagerError> {
        let trip = self.load_trip(filename)?;
        Ok(trip.detect_stops(heuristic, &self.config).into_moving_trip())
    }
}

#[cfg(test)]
fn test_data_manager() -> DataManager {
    DataManager::with_data_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../test_data"))
}

#[test]
fn loads_by_extension() {
    let data_manager = test_data_manager();

    let csv = data_manager.load_trip("triplog.csv").unwrap();
    let gpx = data_manager.load_trip("northbound.gpx").unwrap();

    assert_eq!(csv.len(), 19);
    assert_eq!(gpx.len(), 10);
    assert_eq!(gpx.points(), &csv.points()[..10]);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = test_data_manager().load_trip("does_not_exist.csv");
    assert!(matches!(result, Err(DataManagerError::Io { .. })));
}

#[test]
fn heuristics_disagree_on_which_points_stopped() {
    let data_manager = test_data_manager();

    let h1 = data_manager.moving_trip("triplog.csv", StopHeuristic::PairwiseGap).unwrap();
    let h2 = data_manager.moving_trip("triplog.csv", StopHeuristic::ZoneClustering).unwrap();

    assert_eq!(h1.len(), 14);
    assert_eq!(h2.len(), 14);
    assert_ne!(h1, h2);
}
