use std::{fs::File, io::{BufReader, Read}, path::Path, str::FromStr};

use chrono::{DateTime, Utc};
use trip_stats_lib::{trip::Trip, trip_point::TripPoint};

use crate::DataManagerError;

pub fn read_gpx(path: &Path) -> Result<Trip, DataManagerError> {
    let file = File::open(path).map_err(|source| DataManagerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_gpx(BufReader::new(file))
}

/// Flattens every track and segment into one trip. Point times become whole
/// minutes since the first point. Errors about a single point carry its
/// 1-based position in the trip as the line.
pub fn parse_gpx<R: Read>(reader: R) -> Result<Trip, DataManagerError> {
    let gpx = gpx::read(reader).map_err(|e| DataManagerError::Gpx(e.to_string()))?;

    if let Some(name) = gpx.metadata.as_ref().and_then(|meta| meta.name.as_ref()) {
        tracing::debug!("Reading GPX track '{}'", name);
    }

    let mut start: Option<DateTime<Utc>> = None;
    let mut points = Vec::new();
    for track in gpx.tracks {
        for segment in track.segments {
            for waypoint in segment.points {
                let index = points.len() + 1;
                let time = waypoint.time.ok_or_else(|| DataManagerError::MalformedRecord {
                    line: index as u64,
                    reason: "missing timestamp".into(),
                })?;
                let formatted = time.format().map_err(|e| DataManagerError::Gpx(e.to_string()))?;
                let timestamp = DateTime::<Utc>::from_str(&formatted)
                    .map_err(|e| DataManagerError::Gpx(format!("Track point {} has invalid time: {}", index, e)))?;

                let first = *start.get_or_insert(timestamp);
                let minutes = u32::try_from((timestamp - first).num_minutes()).map_err(|_| {
                    DataManagerError::Gpx(format!("Track point {} is earlier than the first point", index))
                })?;

                let position = waypoint.point();
                points.push(TripPoint::new(minutes, position.y(), position.x()));
            }
        }
    }

    Ok(Trip::new(points))
}

#[test]
fn minutes_since_first_point() {
    let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="trip_stats" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="44.9778" lon="-93.2650"><time>2024-06-01T08:00:00Z</time></trkpt>
      <trkpt lat="44.9868" lon="-93.2650"><time>2024-06-01T08:05:00Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="44.9958" lon="-93.2650"><time>2024-06-01T08:12:30Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    let trip = parse_gpx(input.as_bytes()).unwrap();
    let times: Vec<u32> = trip.points().iter().map(|p| p.time).collect();
    assert_eq!(times, vec![0, 5, 12]);
    assert_eq!(trip.points()[1].latitude(), 44.9868);
    assert_eq!(trip.points()[1].longitude(), -93.2650);
}

#[test]
fn points_need_timestamps() {
    let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="trip_stats" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg><trkpt lat="44.9778" lon="-93.2650"></trkpt></trkseg></trk>
</gpx>"#;

    match parse_gpx(input.as_bytes()) {
        Err(DataManagerError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 1);
            assert_eq!(reason, "missing timestamp");
        }
        other => panic!("Expected malformed record, got {:?}", other),
    }
}
