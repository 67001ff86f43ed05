use geo_types::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single timestamped sample of a trip.
///
/// `time` is whole minutes since the trip started. The position is stored as a
/// `geo_types::Point` with x = longitude and y = latitude, both in degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripPoint {
    pub time: u32,
    pub position: Point,
}

impl TripPoint {
    pub fn new(time: u32, latitude: f64, longitude: f64) -> Self {
        Self {
            time,
            position: Point::new(longitude, latitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}

impl Default for TripPoint {
    fn default() -> Self {
        Self::new(0, 0.0, 0.0)
    }
}

#[test]
fn coordinates_round_trip_through_point() {
    let point = TripPoint::new(15, 44.97, -93.26);
    assert_eq!(point.time, 15);
    assert_eq!(point.latitude(), 44.97);
    assert_eq!(point.longitude(), -93.26);
    assert_eq!(point.position.x(), -93.26);
}

#[test]
fn default_is_origin_at_start() {
    assert_eq!(TripPoint::default(), TripPoint::new(0, 0.0, 0.0));
}
