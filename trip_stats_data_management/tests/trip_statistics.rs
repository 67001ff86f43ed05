use trip_stats_data_management::{DataManager, DataManagerError};
use trip_stats_lib::{
    stop_detection::{StopDetectionConfig, StopHeuristic},
    TripError,
};

fn data_manager() -> DataManager {
    DataManager::with_data_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../test_data"))
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 0.01, "expected {}, got {}", expected, actual);
}

#[test]
fn trip_log_statistics() {
    let stats = data_manager().trip_statistics("triplog.csv", StopHeuristic::PairwiseGap).unwrap();

    assert_close(stats.total_distance_km, 14.86);
    assert_close(stats.total_time_hours, 1.5);
    assert_eq!(stats.num_stops, 5);
    assert_eq!(stats.moving_trip.len(), 14);
    assert_close(stats.moving_time_hours, 65. / 60.);
    assert_close(stats.stopped_time_hours, 25. / 60.);
    assert_close(stats.average_moving_speed_kmh, 13.48);
}

#[test]
fn compare_runs_both_heuristics() {
    let all = data_manager().compare_heuristics("triplog.csv").unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].heuristic, StopHeuristic::PairwiseGap);
    assert_eq!(all[1].heuristic, StopHeuristic::ZoneClustering);
    assert_eq!(all[0].total_distance_km, all[1].total_distance_km);
    assert_eq!(all[1].num_stops, 5);
    assert_close(all[1].average_moving_speed_kmh, 13.09);
}

#[test]
fn thresholds_are_configurable() {
    // A radius below every lingering step leaves nothing to cluster
    let strict = data_manager().with_config(StopDetectionConfig {
        zone_radius_km: 0.001,
        ..Default::default()
    });
    let stats = strict.trip_statistics("triplog.csv", StopHeuristic::ZoneClustering).unwrap();
    assert_eq!(stats.num_stops, 0);
    assert_eq!(stats.moving_trip.len(), 19);
}

#[test]
fn gpx_trip_ending_in_a_stop() {
    let stats = data_manager().trip_statistics("northbound.gpx", StopHeuristic::ZoneClustering).unwrap();

    assert_eq!(stats.num_stops, 5);
    assert_eq!(stats.moving_trip.len(), 5);
    assert_close(stats.total_time_hours, 0.75);
    assert_close(stats.moving_time_hours, 20. / 60.);
}

#[test]
fn fully_stopped_trip_reports_empty_moving_trip() {
    let everything_stops = data_manager().with_config(StopDetectionConfig {
        gap_threshold_km: 100.,
        ..Default::default()
    });
    let result = everything_stops.trip_statistics("triplog.csv", StopHeuristic::PairwiseGap);

    // Only the first point survives, so there is no moving time to divide by
    assert!(matches!(result, Err(DataManagerError::Stats(TripError::ZeroDuration))));
}

#[test]
fn statistics_serialize_to_json() {
    let stats = data_manager().trip_statistics("northbound.gpx", StopHeuristic::PairwiseGap).unwrap();
    let json = serde_json::to_value(&stats).unwrap();

    assert_eq!(json["heuristic"], "h1");
    assert_eq!(json["num_stops"], 4);
    assert_eq!(json["moving_trip"].as_array().map(|points| points.len()), Some(6));
}
