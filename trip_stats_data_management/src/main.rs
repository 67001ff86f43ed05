use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_stats_data_management::{trip_log, DataManager, DataManagerError, DEFAULT_TRIP_LOG};
use trip_stats_lib::{
    statistics::TripStatistics,
    stop_detection::{StopDetectionConfig, StopHeuristic},
};

#[derive(Parser)]
#[command(name = "trip_stats")]
#[command(about = "Movement statistics and stop detection for trip logs", long_about = None)]
struct Cli {
    /// Directory relative file names are looked up in. Defaults to <project root>/data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(flatten)]
    detection: DetectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DetectionArgs {
    /// Largest gap between consecutive points counted as a stop by h1, in km
    #[arg(long, global = true)]
    gap_threshold: Option<f64>,
    /// Stop zone radius used by h2, in km
    #[arg(long, global = true)]
    zone_radius: Option<f64>,
    /// Fewest points in a stop zone for h2 to count it as a stop
    #[arg(long, global = true)]
    min_zone_size: Option<usize>,
}

impl DetectionArgs {
    fn config(&self) -> StopDetectionConfig {
        let defaults = StopDetectionConfig::default();
        StopDetectionConfig {
            gap_threshold_km: self.gap_threshold.unwrap_or(defaults.gap_threshold_km),
            zone_radius_km: self.zone_radius.unwrap_or(defaults.zone_radius_km),
            min_zone_size: self.min_zone_size.unwrap_or(defaults.min_zone_size),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print trip statistics using one stop heuristic
    Stats {
        #[arg(default_value = DEFAULT_TRIP_LOG)]
        file: String,
        #[arg(long, default_value = "h1")]
        heuristic: StopHeuristic,
        /// Print as JSON, including the moving trip
        #[arg(long)]
        json: bool,
    },
    /// Print trip statistics for both heuristics
    Compare {
        #[arg(default_value = DEFAULT_TRIP_LOG)]
        file: String,
        #[arg(long)]
        json: bool,
    },
    /// Write the moving part of the trip to stdout as a trip log
    Moving {
        #[arg(default_value = DEFAULT_TRIP_LOG)]
        file: String,
        #[arg(long, default_value = "h1")]
        heuristic: StopHeuristic,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info,trip_stats_lib=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DataManagerError> {
    let data_manager = match cli.data_dir {
        Some(dir) => DataManager::with_data_dir(dir),
        None => DataManager::start()?,
    }
    .with_config(cli.detection.config());

    match &cli.command {
        Commands::Stats { file, heuristic, json } => {
            let stats = data_manager.trip_statistics(file, *heuristic)?;
            if *json {
                print_json(&stats)?;
            } else {
                print_table(&[stats]);
            }
        }
        Commands::Compare { file, json } => {
            let all = data_manager.compare_heuristics(file)?;
            if *json {
                print_json(&all)?;
            } else {
                print_table(&all);
            }
        }
        Commands::Moving { file, heuristic } => {
            let moving_trip = data_manager.moving_trip(file, *heuristic)?;
            trip_log::write_trip_log(&moving_trip, std::io::stdout().lock())?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), DataManagerError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(all: &[TripStatistics]) {
    print_row("Heuristic", all, |s| s.heuristic.to_string());
    print_row("Total distance (km)", all, |s| format!("{:.2}", s.total_distance_km));
    print_row("Total time (h)", all, |s| format!("{:.2}", s.total_time_hours));
    print_row("Moving time (h)", all, |s| format!("{:.2}", s.moving_time_hours));
    print_row("Stopped time (h)", all, |s| format!("{:.2}", s.stopped_time_hours));
    print_row("Avg moving speed (km/h)", all, |s| format!("{:.2}", s.average_moving_speed_kmh));
    print_row("Stops", all, |s| s.num_stops.to_string());
}

fn print_row(label: &str, all: &[TripStatistics], value: impl Fn(&TripStatistics) -> String) {
    let values: String = all.iter().map(|stats| format!("{:>10}", value(stats))).collect();
    println!("{:<24}{}", label, values);
}

#[test]
fn threshold_flags_override_defaults() {
    use trip_stats_lib::stop_detection::{GAP_THRESHOLD_KM, MIN_ZONE_SIZE};

    let cli = Cli::try_parse_from(["trip_stats", "--zone-radius", "0.2", "stats"]).unwrap();
    let config = cli.detection.config();
    assert_eq!(config.zone_radius_km, 0.2);
    assert_eq!(config.gap_threshold_km, GAP_THRESHOLD_KM);
    assert_eq!(config.min_zone_size, MIN_ZONE_SIZE);
}

#[test]
fn threshold_flags_after_the_subcommand() {
    let cli = Cli::try_parse_from(["trip_stats", "stats", "trip.gpx", "--heuristic", "h2", "--min-zone-size", "4"]).unwrap();
    assert_eq!(cli.detection.config().min_zone_size, 4);
    assert_eq!(cli.detection.config().zone_radius_km, trip_stats_lib::stop_detection::ZONE_RADIUS_KM);

    match cli.command {
        Commands::Stats { file, heuristic, json } => {
            assert_eq!(file, "trip.gpx");
            assert_eq!(heuristic, StopHeuristic::ZoneClustering);
            assert!(!json);
        }
        _ => panic!("Expected the stats command"),
    }
}

#[test]
fn file_defaults_to_trip_log() {
    let cli = Cli::try_parse_from(["trip_stats", "compare"]).unwrap();
    assert!(matches!(cli.command, Commands::Compare { ref file, json: false } if file == DEFAULT_TRIP_LOG));
}
