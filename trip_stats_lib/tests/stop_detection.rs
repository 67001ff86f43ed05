use trip_stats_lib::{
    geo_distance::haversine_distance,
    metrics::{average_speed, total_distance, total_time},
    stop_detection::{PointClass, StopDetectionConfig, StopDetector, StopHeuristic, GAP_THRESHOLD_KM},
    trip::Trip,
    trip_point::TripPoint,
};

// About 1 km of longitude on the equator
const KM: f64 = 0.00899;

/// A wandering trip: bursts of driving separated by lingering of varying length.
fn wandering_trip() -> Vec<TripPoint> {
    let steps_km = [
        1.2, 0.8, 0.05, 0.1, 0.02, 0.3, 2.0, 0.45, 0.49, 0.7, 0.01, 0.01, 1.1, 0.6, 0.2, 0.2, 3.0, 0.05,
    ];
    let mut lon = 0.0;
    let mut points = vec![TripPoint::new(0, 0.0, 0.0)];
    for (i, step) in steps_km.iter().enumerate() {
        lon += step * KM;
        points.push(TripPoint::new((i as u32 + 1) * 5, 0.0, lon));
    }
    points
}

#[test]
fn scenario_single_point() {
    let trip = [TripPoint::new(0, 0.0, 0.0)];
    assert_eq!(total_distance(&trip), Ok(0.0));
    assert_eq!(total_time(&trip), Ok(0.0));
}

#[test]
fn scenario_two_points_one_km_apart() {
    let a = TripPoint::new(0, 0.0, 0.0);
    let b = TripPoint::new(5, 0.0, KM);
    assert!((haversine_distance(&a, &b) - 1.0).abs() < 0.01);
    assert!((average_speed(&a, &b).unwrap() - 12.0).abs() < 0.15);
}

#[test]
fn scenario_five_close_points() {
    let trip: Vec<TripPoint> = (0..5)
        .map(|i| TripPoint::new(i * 5, 0.0, (i % 2) as f64 * 0.05 * KM))
        .collect();
    let detection = StopDetector::default().detect(&trip, StopHeuristic::ZoneClustering);

    assert_eq!(detection.num_stops(), 5);
    assert!(detection.moving_trip().is_empty());
}

#[test]
fn scenario_four_points_two_km_apart() {
    let trip: Vec<TripPoint> = (0..4).map(|i| TripPoint::new(i * 5, 0.0, i as f64 * 2. * KM)).collect();
    let detection = StopDetector::default().detect(&trip, StopHeuristic::PairwiseGap);

    assert_eq!(detection.num_stops(), 0);
    assert_eq!(detection.moving_trip().len(), 4);
}

#[test]
fn pairwise_gap_counts_short_gaps() {
    let trip = wandering_trip();
    let detection = StopDetector::default().detect(&trip, StopHeuristic::PairwiseGap);

    let short_gaps = trip
        .windows(2)
        .filter(|pair| haversine_distance(&pair[0], &pair[1]) <= GAP_THRESHOLD_KM)
        .count();

    assert_eq!(detection.num_stops(), short_gaps);
    assert_eq!(detection.moving_trip().len() + detection.num_stops(), trip.len());
    assert_eq!(detection.moving_trip()[0], trip[0]);
}

#[test]
fn zone_clustering_accounts_for_every_point() {
    let trip = wandering_trip();

    for min_zone_size in 1..6 {
        let detector = StopDetector::new(StopDetectionConfig {
            min_zone_size,
            ..Default::default()
        });
        let detection = detector.detect(&trip, StopHeuristic::ZoneClustering);
        assert_eq!(detection.moving_trip().len() + detection.num_stops(), trip.len());
    }
}

#[test]
fn zone_clustering_never_reports_small_clusters() {
    let trip = wandering_trip();
    let detection = StopDetector::default().detect(&trip, StopHeuristic::ZoneClustering);

    let mut run = 0;
    let mut runs = Vec::new();
    for class in detection.classifications() {
        match class {
            PointClass::Stopped => run += 1,
            PointClass::Moving if run > 0 => {
                runs.push(run);
                run = 0;
            }
            PointClass::Moving => {}
        }
    }
    if run > 0 {
        runs.push(run);
    }

    assert!(!runs.is_empty());
    assert!(runs.iter().all(|len| *len >= 3), "stop runs: {:?}", runs);
    // Zones can sit back to back, so there are at least as many zones as runs
    assert!(detection.stop_events() >= runs.len());
    assert!(detection.num_stops() >= 3 * detection.stop_events());
}

#[test]
fn moving_trip_keeps_input_order() {
    let trip = wandering_trip();

    for heuristic in StopHeuristic::ALL {
        let detection = StopDetector::default().detect(&trip, heuristic);
        assert!(detection.moving_trip().windows(2).all(|pair| pair[0].time < pair[1].time));
    }
}

#[test]
fn runs_do_not_share_state() {
    let trip: Trip = wandering_trip().into();
    let config = StopDetectionConfig::default();

    let first_h1 = trip.detect_stops(StopHeuristic::PairwiseGap, &config);
    let h2 = trip.detect_stops(StopHeuristic::ZoneClustering, &config);
    let second_h1 = trip.detect_stops(StopHeuristic::PairwiseGap, &config);

    assert_eq!(first_h1, second_h1);
    assert_eq!(h2, trip.detect_stops(StopHeuristic::ZoneClustering, &config));
}
