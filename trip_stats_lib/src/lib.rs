pub mod error;
pub mod geo_distance;
pub mod metrics;
pub mod moving_metrics;
pub mod statistics;
pub mod stop_detection;
pub mod trip;
pub mod trip_point;

pub use error::TripError;
