//! Time and speed while moving, derived from a stop detection run.
//!
//! Moving and stopped time are approximations: they assume every retained point
//! stands for one sampling interval of [`SAMPLING_INTERVAL_MINUTES`] and do not
//! read the timestamps of the moving trip, which has gaps where stops were removed.

use crate::{error::TripError, geo_distance::path_length, trip_point::TripPoint};

/// Assumed minutes between two consecutive samples of the original trip.
pub const SAMPLING_INTERVAL_MINUTES: u32 = 5;

fn intervals_to_hours(intervals: usize) -> f64 {
    (intervals as f64 * SAMPLING_INTERVAL_MINUTES as f64) / 60.
}

/// Hours spent moving: one sampling interval between each pair of retained points.
pub fn moving_time(moving_trip: &[TripPoint]) -> Result<f64, TripError> {
    if moving_trip.is_empty() {
        return Err(TripError::EmptyTrip);
    }
    Ok(intervals_to_hours(moving_trip.len() - 1))
}

/// Hours spent stopped: one sampling interval per point dropped from the trip.
pub fn stopped_time(trip: &[TripPoint], moving_trip: &[TripPoint]) -> f64 {
    intervals_to_hours(trip.len().saturating_sub(moving_trip.len()))
}

/// Average speed while moving in km/h.
pub fn average_moving_speed(moving_trip: &[TripPoint]) -> Result<f64, TripError> {
    let hours = moving_time(moving_trip)?;
    if hours == 0. {
        return Err(TripError::ZeroDuration);
    }
    Ok(path_length(moving_trip) / hours)
}

#[test]
fn moving_time_counts_intervals() {
    let moving: Vec<TripPoint> = (0..13).map(|i| TripPoint::new(i * 5, 0.0, 0.0)).collect();
    assert_eq!(moving_time(&moving), Ok(1.0));
    assert_eq!(moving_time(&moving[..1]), Ok(0.0));
}

#[test]
fn moving_time_ignores_timestamps() {
    // Timestamps jump where stops were removed, the estimate does not
    let moving = [TripPoint::new(0, 0.0, 0.0), TripPoint::new(120, 0.0, 0.1), TripPoint::new(125, 0.0, 0.2)];
    assert_eq!(moving_time(&moving), Ok(10. / 60.));
}

#[test]
fn stopped_time_counts_dropped_points() {
    let trip: Vec<TripPoint> = (0..20).map(|i| TripPoint::new(i * 5, 0.0, 0.0)).collect();
    assert_eq!(stopped_time(&trip, &trip[..8]), 1.0);
    assert_eq!(stopped_time(&trip, &trip), 0.0);
}

#[test]
fn average_moving_speed_over_retained_points() {
    // Two 1 km hops, 10 minutes of moving time
    let moving = [TripPoint::new(0, 0.0, 0.0), TripPoint::new(5, 0.0, 0.00899), TripPoint::new(10, 0.0, 0.01798)];
    let speed = average_moving_speed(&moving).unwrap();
    assert!((speed - 12.0).abs() < 0.15);
}

#[test]
fn moving_metrics_errors() {
    assert_eq!(moving_time(&[]), Err(TripError::EmptyTrip));
    assert_eq!(average_moving_speed(&[]), Err(TripError::EmptyTrip));
    assert_eq!(average_moving_speed(&[TripPoint::default()]), Err(TripError::ZeroDuration));
}
