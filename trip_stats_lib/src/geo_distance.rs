use crate::trip_point::TripPoint;

/// Mean radius of the earth in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km between two points, by the haversine formula.
pub fn haversine_distance(p1: &TripPoint, p2: &TripPoint) -> f64 {
    let d_lat = (p2.latitude() - p1.latitude()).to_radians();
    let d_lon = (p2.longitude() - p1.longitude()).to_radians();
    let lat1 = p1.latitude().to_radians();
    let lat2 = p2.latitude().to_radians();

    let a = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);
    let c = 2. * f64::asin(f64::sqrt(a));

    EARTH_RADIUS_KM * c
}

/// Sum of the distances between consecutive points.
pub fn path_length(points: &[TripPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

#[test]
fn distance_is_symmetric() {
    let a = TripPoint::new(0, 44.9778, -93.2650);
    let b = TripPoint::new(5, 46.7867, -92.1005);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn distance_to_self_is_zero() {
    let a = TripPoint::new(0, 51.5074, -0.1278);
    assert_eq!(haversine_distance(&a, &a), 0.0);
}

#[test]
fn one_km_along_equator() {
    let origin = TripPoint::new(0, 0.0, 0.0);
    let east = TripPoint::new(5, 0.0, 0.00899);
    assert!((haversine_distance(&origin, &east) - 1.0).abs() < 0.01);
}

#[test]
fn berlin_to_paris() {
    let berlin = TripPoint::new(0, 52.5200, 13.4050);
    let paris = TripPoint::new(0, 48.8566, 2.3522);
    assert!((haversine_distance(&berlin, &paris) - 878.0).abs() < 10.0);
}

#[test]
fn path_length_of_short_paths() {
    assert_eq!(path_length(&[]), 0.0);
    assert_eq!(path_length(&[TripPoint::new(0, 1.0, 1.0)]), 0.0);

    let points = [TripPoint::new(0, 0.0, 0.0), TripPoint::new(5, 0.0, 0.00899), TripPoint::new(10, 0.0, 0.01798)];
    assert!((path_length(&points) - 2.0).abs() < 0.02);
}
