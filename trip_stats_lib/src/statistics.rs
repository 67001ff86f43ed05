#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::TripError,
    moving_metrics,
    stop_detection::{StopDetectionConfig, StopHeuristic},
    trip::Trip,
    trip_point::TripPoint,
};

/// All statistics reported for one trip and one stop heuristic.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TripStatistics {
    pub heuristic: StopHeuristic,
    pub total_distance_km: f64,
    pub total_time_hours: f64,
    pub moving_time_hours: f64,
    pub stopped_time_hours: f64,
    pub average_moving_speed_kmh: f64,
    pub num_stops: usize,
    pub moving_trip: Vec<TripPoint>,
}

impl TripStatistics {
    /// Runs stop detection and derives every statistic from it.
    /// Fails on the first statistic that cannot be computed.
    pub fn compute(trip: &Trip, heuristic: StopHeuristic, config: &StopDetectionConfig) -> Result<Self, TripError> {
        let total_distance_km = trip.total_distance()?;
        let total_time_hours = trip.total_time()?;

        let detection = trip.detect_stops(heuristic, config);
        let num_stops = detection.num_stops();
        let moving_trip = detection.into_moving_trip();

        let moving_time_hours = moving_metrics::moving_time(&moving_trip)?;
        let stopped_time_hours = moving_metrics::stopped_time(trip.points(), &moving_trip);
        let average_moving_speed_kmh = moving_metrics::average_moving_speed(&moving_trip)?;

        Ok(Self {
            heuristic,
            total_distance_km,
            total_time_hours,
            moving_time_hours,
            stopped_time_hours,
            average_moving_speed_kmh,
            num_stops,
            moving_trip,
        })
    }
}

#[test]
fn statistics_for_a_trip_with_one_stop() {
    // 1 km hops east, with a three sample stop after the fourth point
    let trip: Trip = vec![
        TripPoint::new(0, 0.0, 0.0),
        TripPoint::new(5, 0.0, 0.00899),
        TripPoint::new(10, 0.0, 0.01798),
        TripPoint::new(15, 0.0, 0.02697),
        TripPoint::new(20, 0.0, 0.02700),
        TripPoint::new(25, 0.0, 0.02703),
        TripPoint::new(30, 0.0, 0.03602),
    ]
    .into();

    let stats = TripStatistics::compute(&trip, StopHeuristic::ZoneClustering, &StopDetectionConfig::default()).unwrap();
    assert_eq!(stats.num_stops, 3);
    assert_eq!(stats.moving_trip.len(), 4);
    assert_eq!(stats.total_time_hours, 0.5);
    assert_eq!(stats.moving_time_hours, 0.25);
    assert_eq!(stats.stopped_time_hours, 0.25);
    assert!((stats.total_distance_km - 4.0).abs() < 0.05);

    let h1 = TripStatistics::compute(&trip, StopHeuristic::PairwiseGap, &StopDetectionConfig::default()).unwrap();
    assert_eq!(h1.num_stops, 2);
    assert_eq!(h1.moving_trip.len(), 5);
}

#[test]
fn statistics_fail_without_moving_points() {
    let trip: Trip = (0..5).map(|i| TripPoint::new(i * 5, 0.0, i as f64 * 0.0002)).collect();
    let result = TripStatistics::compute(&trip, StopHeuristic::ZoneClustering, &StopDetectionConfig::default());
    assert_eq!(result, Err(TripError::EmptyTrip));
}

#[test]
fn statistics_fail_on_empty_trip() {
    let result = TripStatistics::compute(&Trip::default(), StopHeuristic::PairwiseGap, &StopDetectionConfig::default());
    assert_eq!(result, Err(TripError::EmptyTrip));
}
