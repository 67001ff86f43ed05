use crate::{error::TripError, geo_distance::{haversine_distance, path_length}, trip_point::TripPoint};

/// Elapsed trip time in hours, read from the last point.
pub fn total_time(trip: &[TripPoint]) -> Result<f64, TripError> {
    let last = trip.last().ok_or(TripError::EmptyTrip)?;
    Ok(last.time as f64 / 60.)
}

/// Distance travelled in km, summed over consecutive points.
pub fn total_distance(trip: &[TripPoint]) -> Result<f64, TripError> {
    if trip.is_empty() {
        return Err(TripError::EmptyTrip);
    }
    Ok(path_length(trip))
}

/// Average speed between two points in km/h.
pub fn average_speed(a: &TripPoint, b: &TripPoint) -> Result<f64, TripError> {
    let minutes = a.time.abs_diff(b.time);
    if minutes == 0 {
        return Err(TripError::ZeroDuration);
    }

    let km_per_minute = haversine_distance(a, b) / minutes as f64;
    Ok(km_per_minute * 60.)
}

#[test]
fn single_point_trip() {
    let trip = [TripPoint::new(0, 0.0, 0.0)];
    assert_eq!(total_distance(&trip), Ok(0.0));
    assert_eq!(total_time(&trip), Ok(0.0));
}

#[test]
fn two_points_one_km_apart() {
    let a = TripPoint::new(0, 0.0, 0.0);
    let b = TripPoint::new(5, 0.0, 0.00899);

    let distance = total_distance(&[a, b]).unwrap();
    assert!((distance - 1.0).abs() < 0.01);

    let speed = average_speed(&a, &b).unwrap();
    assert!((speed - 12.0).abs() < 0.15);

    // Order of arguments does not matter
    assert_eq!(average_speed(&b, &a), average_speed(&a, &b));
}

#[test]
fn total_time_uses_last_point() {
    let trip = [TripPoint::new(0, 0.0, 0.0), TripPoint::new(45, 0.0, 0.1), TripPoint::new(90, 0.0, 0.2)];
    assert_eq!(total_time(&trip), Ok(1.5));
}

#[test]
fn zero_duration_speed() {
    let a = TripPoint::new(10, 0.0, 0.0);
    let b = TripPoint::new(10, 1.0, 1.0);
    assert_eq!(average_speed(&a, &b), Err(TripError::ZeroDuration));
}

#[test]
fn empty_trip() {
    assert_eq!(total_time(&[]), Err(TripError::EmptyTrip));
    assert_eq!(total_distance(&[]), Err(TripError::EmptyTrip));
}
