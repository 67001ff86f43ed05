use std::path::PathBuf;

use thiserror::Error;
use trip_stats_lib::TripError;

mod data_manager;
pub mod gpx_util;
pub mod trip_log;

pub use data_manager::*;

pub const DATA_DIR: &str = "data/";
pub const DEFAULT_TRIP_LOG: &str = "triplog.csv";

#[derive(Debug, Error)]
pub enum DataManagerError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// `line` is the 1-based line of a trip log, or the track point number of a GPX file.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
    #[error("Failed to read trip log: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read GPX: {0}")]
    Gpx(String),
    #[error(transparent)]
    Stats(#[from] TripError),
}
