use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{geo_distance::haversine_distance, trip_point::TripPoint};

/// Consecutive points closer than this (km) count as a stop in the pairwise gap heuristic.
pub const GAP_THRESHOLD_KM: f64 = 0.6;
/// A point within this distance (km) of any stop zone member joins the zone.
pub const ZONE_RADIUS_KM: f64 = 0.5;
/// Smallest stop zone that is reported as a stop.
pub const MIN_ZONE_SIZE: usize = 3;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopHeuristic {
    /// H1: a point is a stop when it lies within the gap threshold of its predecessor.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "h1"))]
    PairwiseGap,
    /// H2: stops are clusters of at least `min_zone_size` mutually close points.
    #[cfg_attr(feature = "serde", serde(rename = "h2"))]
    ZoneClustering,
}

impl StopHeuristic {
    pub const ALL: [StopHeuristic; 2] = [StopHeuristic::PairwiseGap, StopHeuristic::ZoneClustering];
}

impl fmt::Display for StopHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopHeuristic::PairwiseGap => write!(f, "h1"),
            StopHeuristic::ZoneClustering => write!(f, "h2"),
        }
    }
}

impl FromStr for StopHeuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h1" | "gap" => Ok(StopHeuristic::PairwiseGap),
            "h2" | "zone" => Ok(StopHeuristic::ZoneClustering),
            other => Err(format!("Unknown stop heuristic '{}', expected h1 or h2", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopDetectionConfig {
    pub gap_threshold_km: f64,
    pub zone_radius_km: f64,
    pub min_zone_size: usize,
}

impl Default for StopDetectionConfig {
    fn default() -> Self {
        Self {
            gap_threshold_km: GAP_THRESHOLD_KM,
            zone_radius_km: ZONE_RADIUS_KM,
            min_zone_size: MIN_ZONE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    Moving,
    Stopped,
}

/// Result of one stop detection run.
///
/// Every run builds a fresh value, nothing is shared between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StopDetection {
    classifications: Vec<PointClass>,
    moving_trip: Vec<TripPoint>,
    num_stops: usize,
    stop_events: usize,
}

impl StopDetection {
    fn from_classifications(trip: &[TripPoint], classifications: Vec<PointClass>, stop_events: usize) -> Self {
        let moving_trip: Vec<TripPoint> = trip
            .iter()
            .zip(&classifications)
            .filter(|(_, class)| **class == PointClass::Moving)
            .map(|(point, _)| *point)
            .collect();
        let num_stops = classifications.len() - moving_trip.len();

        Self {
            classifications,
            moving_trip,
            num_stops,
            stop_events,
        }
    }

    /// One entry per input point, in input order.
    pub fn classifications(&self) -> &[PointClass] {
        &self.classifications
    }

    pub fn moving_trip(&self) -> &[TripPoint] {
        &self.moving_trip
    }

    pub fn into_moving_trip(self) -> Vec<TripPoint> {
        self.moving_trip
    }

    /// Number of points classified as stopped.
    pub fn num_stops(&self) -> usize {
        self.num_stops
    }

    /// Number of distinct stops: runs of consecutive stopped points for H1,
    /// committed stop zones for H2.
    pub fn stop_events(&self) -> usize {
        self.stop_events
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StopDetector {
    config: StopDetectionConfig,
}

impl StopDetector {
    pub fn new(config: StopDetectionConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, trip: &[TripPoint], heuristic: StopHeuristic) -> StopDetection {
        let detection = match heuristic {
            StopHeuristic::PairwiseGap => self.pairwise_gap(trip),
            StopHeuristic::ZoneClustering => self.zone_clustering(trip),
        };

        debug!(
            "{} stop detection: {} of {} points stopped, {} stop events",
            heuristic,
            detection.num_stops(),
            trip.len(),
            detection.stop_events()
        );

        detection
    }

    /// H1. The first point is always moving, every later point is moving only
    /// if it is strictly further than the gap threshold from its predecessor.
    pub fn pairwise_gap(&self, trip: &[TripPoint]) -> StopDetection {
        let classifications: Vec<PointClass> = trip
            .first()
            .map(|_| PointClass::Moving)
            .into_iter()
            .chain(trip.windows(2).map(|pair| {
                if haversine_distance(&pair[0], &pair[1]) > self.config.gap_threshold_km {
                    PointClass::Moving
                } else {
                    PointClass::Stopped
                }
            }))
            .collect();

        let stop_events = classifications
            .windows(2)
            .filter(|pair| pair[0] == PointClass::Moving && pair[1] == PointClass::Stopped)
            .count();

        StopDetection::from_classifications(trip, classifications, stop_events)
    }

    /// H2. Single forward pass keeping one open stop zone.
    ///
    /// With no open zone, a point close to any point still classified as moving
    /// opens a zone holding itself and every such moving point. An open zone
    /// grows while new points are close to any member, and is resolved on the
    /// first point that is not: large enough zones become stopped, smaller ones
    /// stay moving. The point that closed the zone stays moving. A zone still
    /// open at the end is resolved the same way.
    pub fn zone_clustering(&self, trip: &[TripPoint]) -> StopDetection {
        let mut classifications = vec![PointClass::Moving; trip.len()];
        let mut zone: Vec<usize> = Vec::new();
        let mut stop_events = 0;

        for (i, point) in trip.iter().enumerate() {
            if zone.is_empty() {
                zone.extend((0..i).filter(|&j| {
                    classifications[j] == PointClass::Moving && self.within_zone_radius(&trip[j], point)
                }));
                if !zone.is_empty() {
                    zone.push(i);
                }
            } else if zone.iter().any(|&member| self.within_zone_radius(&trip[member], point)) {
                zone.push(i);
            } else {
                if self.resolve_zone(&mut classifications, &zone) {
                    stop_events += 1;
                }
                zone.clear();
            }
        }

        if self.resolve_zone(&mut classifications, &zone) {
            stop_events += 1;
        }

        StopDetection::from_classifications(trip, classifications, stop_events)
    }

    fn within_zone_radius(&self, a: &TripPoint, b: &TripPoint) -> bool {
        haversine_distance(a, b) <= self.config.zone_radius_km
    }

    /// Marks the zone stopped when it is large enough. Returns whether it was.
    fn resolve_zone(&self, classifications: &mut [PointClass], zone: &[usize]) -> bool {
        if zone.is_empty() {
            return false;
        }
        if zone.len() < self.config.min_zone_size {
            debug!("Stop zone at points {:?} too small, kept as moving", zone);
            return false;
        }

        debug!("Stop zone at points {:?} committed ({} points)", zone, zone.len());
        for &member in zone {
            classifications[member] = PointClass::Stopped;
        }
        true
    }
}

#[cfg(test)]
fn spaced_east(count: u32, spacing_deg: f64) -> Vec<TripPoint> {
    (0..count)
        .map(|i| TripPoint::new(i * 5, 0.0, i as f64 * spacing_deg))
        .collect()
}

// 1 km along the equator is about 0.00899 degrees of longitude
#[cfg(test)]
const KM: f64 = 0.00899;

#[test]
fn h1_far_apart_points_are_all_moving() {
    let trip = spaced_east(4, 2. * KM);
    let detection = StopDetector::default().pairwise_gap(&trip);

    assert_eq!(detection.num_stops(), 0);
    assert_eq!(detection.moving_trip(), trip.as_slice());
}

#[test]
fn h1_counts_short_gaps() {
    // Gaps: 2 km, 0.1 km, 0.1 km, 2 km
    let trip = vec![
        TripPoint::new(0, 0.0, 0.0),
        TripPoint::new(5, 0.0, 2. * KM),
        TripPoint::new(10, 0.0, 2.1 * KM),
        TripPoint::new(15, 0.0, 2.2 * KM),
        TripPoint::new(20, 0.0, 4.2 * KM),
    ];
    let detection = StopDetector::default().pairwise_gap(&trip);

    assert_eq!(detection.num_stops(), 2);
    assert_eq!(detection.moving_trip(), &[trip[0], trip[1], trip[4]]);
    assert_eq!(detection.stop_events(), 1);
    assert_eq!(detection.moving_trip().len() + detection.num_stops(), trip.len());
}

#[test]
fn h1_gap_equal_to_threshold_is_a_stop() {
    let trip = spaced_east(2, KM);
    let gap = haversine_distance(&trip[0], &trip[1]);
    let detector = StopDetector::new(StopDetectionConfig {
        gap_threshold_km: gap,
        ..Default::default()
    });

    assert_eq!(detector.pairwise_gap(&trip).num_stops(), 1);
}

#[test]
fn h1_tiny_trips() {
    let detector = StopDetector::default();

    let empty = detector.pairwise_gap(&[]);
    assert!(empty.moving_trip().is_empty());
    assert_eq!(empty.num_stops(), 0);

    let single = [TripPoint::new(0, 10.0, 10.0)];
    let detection = detector.pairwise_gap(&single);
    assert_eq!(detection.moving_trip(), &single);
    assert_eq!(detection.num_stops(), 0);
}

#[test]
fn h2_cluster_of_five_is_one_stop() {
    // All within 0.1 km of each other
    let trip = spaced_east(5, 0.02 * KM);
    let detection = StopDetector::default().zone_clustering(&trip);

    assert_eq!(detection.num_stops(), 5);
    assert!(detection.moving_trip().is_empty());
    assert_eq!(detection.stop_events(), 1);
}

#[test]
fn h2_pair_is_too_small_for_a_stop() {
    let trip = vec![
        TripPoint::new(0, 0.0, 0.0),
        TripPoint::new(5, 0.0, 2. * KM),
        TripPoint::new(10, 0.0, 2.1 * KM),
        TripPoint::new(15, 0.0, 4.1 * KM),
    ];
    let detection = StopDetector::default().zone_clustering(&trip);

    assert_eq!(detection.num_stops(), 0);
    assert_eq!(detection.moving_trip(), trip.as_slice());
}

#[test]
fn h2_stop_in_the_middle_of_a_trip() {
    let trip = vec![
        TripPoint::new(0, 0.0, 0.0),
        TripPoint::new(5, 0.0, 2. * KM),
        TripPoint::new(10, 0.0, 2.1 * KM),
        TripPoint::new(15, 0.0, 2.15 * KM),
        TripPoint::new(20, 0.0, 2.2 * KM),
        TripPoint::new(25, 0.0, 5. * KM),
        TripPoint::new(30, 0.0, 8. * KM),
    ];
    let detection = StopDetector::default().zone_clustering(&trip);

    assert_eq!(detection.num_stops(), 4);
    assert_eq!(detection.moving_trip(), &[trip[0], trip[5], trip[6]]);
    assert_eq!(
        detection.classifications(),
        &[
            PointClass::Moving,
            PointClass::Stopped,
            PointClass::Stopped,
            PointClass::Stopped,
            PointClass::Stopped,
            PointClass::Moving,
            PointClass::Moving,
        ]
    );
}

#[test]
fn h2_revisited_location_joins_the_stop() {
    // Out to 4 km and back, lingering near the moving point at 2 km
    let trip = vec![
        TripPoint::new(0, 0.0, 0.0),
        TripPoint::new(5, 0.0, 2. * KM),
        TripPoint::new(10, 0.0, 4. * KM),
        TripPoint::new(15, 0.0, 2.1 * KM),
        TripPoint::new(20, 0.0, 2.15 * KM),
        TripPoint::new(25, 0.0, 2.2 * KM),
        TripPoint::new(30, 0.0, 8. * KM),
    ];
    let detection = StopDetector::default().zone_clustering(&trip);

    assert_eq!(
        detection.classifications(),
        &[
            PointClass::Moving,
            PointClass::Stopped,
            PointClass::Moving,
            PointClass::Stopped,
            PointClass::Stopped,
            PointClass::Stopped,
            PointClass::Moving,
        ]
    );
    assert_eq!(detection.num_stops(), 4);
    assert_eq!(detection.stop_events(), 1);
    assert_eq!(detection.moving_trip(), &[trip[0], trip[2], trip[6]]);
}

#[test]
fn h2_back_to_back_zones_are_separate_events() {
    // Two clusters 0.7 km apart: the first point of the second cluster closes
    // the first zone and opens the next one with its successor
    let trip = vec![
        TripPoint::new(0, 0.0, 0.0),
        TripPoint::new(5, 0.0, 0.1 * KM),
        TripPoint::new(10, 0.0, 0.2 * KM),
        TripPoint::new(15, 0.0, 0.9 * KM),
        TripPoint::new(20, 0.0, 1.0 * KM),
        TripPoint::new(25, 0.0, 1.1 * KM),
    ];
    let detection = StopDetector::default().zone_clustering(&trip);

    assert_eq!(detection.num_stops(), 6);
    assert_eq!(detection.stop_events(), 2);
}

#[test]
fn h2_zone_grows_through_any_member() {
    // Each point is 0.4 km from the previous one, so the zone keeps growing
    // even though its ends end up far apart.
    let trip = spaced_east(6, 0.4 * KM);
    let detection = StopDetector::default().zone_clustering(&trip);

    assert_eq!(detection.num_stops(), 6);
    assert!(detection.moving_trip().is_empty());
}

#[test]
fn h2_respects_min_zone_size() {
    let trip = spaced_east(3, 0.1 * KM);
    let strict = StopDetector::new(StopDetectionConfig {
        min_zone_size: 4,
        ..Default::default()
    });

    assert_eq!(strict.zone_clustering(&trip).num_stops(), 0);
    assert_eq!(StopDetector::default().zone_clustering(&trip).num_stops(), 3);
}

#[test]
fn h2_accounts_for_every_point() {
    let mut trip = Vec::new();
    let mut lon = 0.0;
    for i in 0..60u32 {
        // Alternate between bursts of driving and lingering
        lon += if (i / 7) % 2 == 0 { 1.5 * KM } else { 0.05 * KM };
        trip.push(TripPoint::new(i * 5, 0.0, lon));
    }

    for detection in [StopDetector::default().zone_clustering(&trip), StopDetector::default().pairwise_gap(&trip)] {
        assert_eq!(detection.moving_trip().len() + detection.num_stops(), trip.len());
        assert_eq!(detection.classifications().len(), trip.len());
    }
}

#[test]
fn detection_is_repeatable() {
    let trip = spaced_east(8, 0.3 * KM);
    let detector = StopDetector::default();

    for heuristic in StopHeuristic::ALL {
        assert_eq!(detector.detect(&trip, heuristic), detector.detect(&trip, heuristic));
    }
}

#[test]
fn heuristic_names() {
    assert_eq!("h1".parse::<StopHeuristic>(), Ok(StopHeuristic::PairwiseGap));
    assert_eq!("ZONE".parse::<StopHeuristic>(), Ok(StopHeuristic::ZoneClustering));
    assert!("h3".parse::<StopHeuristic>().is_err());
    assert_eq!(StopHeuristic::ZoneClustering.to_string(), "h2");
}
