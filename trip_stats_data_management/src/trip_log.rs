//! Comma separated trip logs: `time,latitude,longitude` per row, time in
//! minutes since the trip started. Header rows are recognised by the `Time` token.

use std::{fs::File, io::{Read, Write}, path::Path, str::FromStr};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use trip_stats_lib::{trip::Trip, trip_point::TripPoint};

use crate::DataManagerError;

const HEADER_TOKEN: &str = "Time";
const HEADER: [&str; 3] = ["Time", "Latitude", "Longitude"];

pub fn read_trip_log(path: &Path) -> Result<Trip, DataManagerError> {
    let file = File::open(path).map_err(|source| DataManagerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trip_log(file)
}

pub fn parse_trip_log<R: Read>(reader: R) -> Result<Trip, DataManagerError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.map_err(record_error)?;
        if record.iter().any(|field| field.contains(HEADER_TOKEN)) {
            continue;
        }
        points.push(parse_record(&record)?);
    }

    Ok(Trip::new(points))
}

/// Undecodable text is reported against its line like any other bad row.
fn record_error(error: csv::Error) -> DataManagerError {
    if let csv::ErrorKind::Utf8 { pos: Some(pos), err, .. } = error.kind() {
        return DataManagerError::MalformedRecord {
            line: pos.line(),
            reason: format!("invalid UTF-8 in field {}", err.field() + 1),
        };
    }
    DataManagerError::Csv(error)
}

fn parse_record(record: &StringRecord) -> Result<TripPoint, DataManagerError> {
    let line = record.position().map(|pos| pos.line()).unwrap_or_default();

    let time = parse_field::<u32>(record, 0, "time", line)?;
    let latitude = parse_field::<f64>(record, 1, "latitude", line)?;
    let longitude = parse_field::<f64>(record, 2, "longitude", line)?;

    Ok(TripPoint::new(time, latitude, longitude))
}

fn parse_field<T: FromStr>(record: &StringRecord, index: usize, name: &str, line: u64) -> Result<T, DataManagerError> {
    let field = record.get(index).ok_or_else(|| DataManagerError::MalformedRecord {
        line,
        reason: format!("missing {} field", name),
    })?;

    field.parse::<T>().map_err(|_| DataManagerError::MalformedRecord {
        line,
        reason: format!("invalid {} '{}'", name, field),
    })
}

pub fn write_trip_log<W: Write>(points: &[TripPoint], writer: W) -> Result<(), DataManagerError> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(HEADER)?;
    for point in points {
        writer.write_record(&[
            point.time.to_string(),
            point.latitude().to_string(),
            point.longitude().to_string(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

#[test]
fn skips_header_and_parses_positionally() {
    let input = "Time,Latitude,Longitude\n0,44.9778,-93.2650\n5, 44.9868 ,-93.2650\n";
    let trip = parse_trip_log(input.as_bytes()).unwrap();

    assert_eq!(trip.points(), &[TripPoint::new(0, 44.9778, -93.2650), TripPoint::new(5, 44.9868, -93.2650)]);
}

#[test]
fn header_anywhere_is_skipped() {
    let input = "0,1.0,2.0\nTime,Lat,Lon\n5,1.5,2.5,extra\n";
    let trip = parse_trip_log(input.as_bytes()).unwrap();
    assert_eq!(trip.len(), 2);
    assert_eq!(trip.points()[1], TripPoint::new(5, 1.5, 2.5));
}

#[test]
fn malformed_rows_report_their_line() {
    let bad_number = "Time,Latitude,Longitude\n0,1.0,2.0\n5,north,2.0\n";
    match parse_trip_log(bad_number.as_bytes()) {
        Err(DataManagerError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 3);
            assert!(reason.contains("latitude"));
        }
        other => panic!("Expected malformed record, got {:?}", other),
    }

    let missing_field = "0,1.0\n";
    assert!(matches!(
        parse_trip_log(missing_field.as_bytes()),
        Err(DataManagerError::MalformedRecord { line: 1, .. })
    ));

    let negative_time = "-5,1.0,2.0\n";
    assert!(matches!(parse_trip_log(negative_time.as_bytes()), Err(DataManagerError::MalformedRecord { .. })));
}

#[test]
fn invalid_utf8_reports_its_line() {
    let input: &[u8] = b"Time,Latitude,Longitude\n0,1.0,2.0\n5,\xff\xfe,2.0\n";
    match parse_trip_log(input) {
        Err(DataManagerError::MalformedRecord { line, reason }) => {
            assert_eq!(line, 3);
            assert!(reason.contains("UTF-8"));
        }
        other => panic!("Expected malformed record, got {:?}", other),
    }
}

#[test]
fn written_log_reads_back() {
    let points = vec![TripPoint::new(0, 44.9778, -93.265), TripPoint::new(5, 44.9868, -93.265)];
    let mut buffer = Vec::new();
    write_trip_log(&points, &mut buffer).unwrap();

    assert!(String::from_utf8_lossy(&buffer).starts_with("Time,Latitude,Longitude\n"));
    assert_eq!(parse_trip_log(buffer.as_slice()).unwrap().points(), points.as_slice());
}
