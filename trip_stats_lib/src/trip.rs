use crate::{
    error::TripError,
    metrics,
    stop_detection::{StopDetection, StopDetectionConfig, StopDetector, StopHeuristic},
    trip_point::TripPoint,
};

/// The full ordered sequence of points of one trip, as handed over by a loader.
///
/// Read-only once built. Derived data like the moving trip is produced by
/// stop detection and never written back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trip {
    points: Vec<TripPoint>,
}

impl Trip {
    pub fn new(points: Vec<TripPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TripPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when no point has an earlier time than its predecessor.
    /// All derived statistics assume this holds.
    pub fn is_chronological(&self) -> bool {
        self.points.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }

    pub fn total_time(&self) -> Result<f64, TripError> {
        metrics::total_time(&self.points)
    }

    pub fn total_distance(&self) -> Result<f64, TripError> {
        metrics::total_distance(&self.points)
    }

    pub fn detect_stops(&self, heuristic: StopHeuristic, config: &StopDetectionConfig) -> StopDetection {
        StopDetector::new(*config).detect(&self.points, heuristic)
    }
}

impl From<Vec<TripPoint>> for Trip {
    fn from(points: Vec<TripPoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<TripPoint> for Trip {
    fn from_iter<I: IntoIterator<Item = TripPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[test]
fn chronological_check() {
    let ordered: Trip = vec![TripPoint::new(0, 0., 0.), TripPoint::new(5, 0., 0.), TripPoint::new(5, 0., 0.)].into();
    assert!(ordered.is_chronological());

    let unordered: Trip = vec![TripPoint::new(10, 0., 0.), TripPoint::new(5, 0., 0.)].into();
    assert!(!unordered.is_chronological());

    assert!(Trip::default().is_chronological());
}

#[test]
fn empty_trip_has_no_statistics() {
    let trip = Trip::default();
    assert!(trip.is_empty());
    assert_eq!(trip.total_time(), Err(TripError::EmptyTrip));
    assert_eq!(trip.total_distance(), Err(TripError::EmptyTrip));
}
