//! Station-reading aggregation.
//!
//! Joins one fetch cycle's readings to the station directory, classifies
//! each reading, and computes the regional summary. The function is pure:
//! logging aside, the same input always produces the same `AggregateResult`.

use crate::analysis::timestamps;
use crate::grading::thresholds::classify_pm10;
use crate::model::{
    AggregateError, AggregateResult, Coordinate, CoordinateMap, CoordinateSource, NO_TIME_PLACEHOLDER,
    RawReading, RecordFailure, StationReading,
};

/// Placeholders the feed uses for "no measurement".
pub const NO_DATA_MARKERS: [&str; 2] = ["-", ""];

/// Parses a raw PM10 string. Placeholder markers become the sentinel `0`.
///
/// Non-finite values (`NaN`, `inf`) are rejected rather than classified.
pub fn parse_pm10(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if NO_DATA_MARKERS.contains(&trimmed) {
        return Ok(0.0);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| format!("invalid PM10 value '{}'", raw))?;
    if !value.is_finite() {
        return Err(format!("non-finite PM10 value '{}'", raw));
    }
    Ok(value)
}

/// Joins one reading to its coordinate and band.
fn build_station_reading(
    reading: &RawReading,
    coordinates: &CoordinateMap,
    fallback: Coordinate,
) -> Result<StationReading, String> {
    let station_name = reading
        .station_name
        .as_deref()
        .ok_or_else(|| "record has no station name".to_string())?;
    let raw_value = reading
        .pm10_value
        .as_deref()
        .ok_or_else(|| "PM10 value is missing".to_string())?;
    let value = parse_pm10(raw_value)?;

    let (coordinate, coordinate_source) = match coordinates.get(station_name) {
        Some(c) => (*c, CoordinateSource::Directory),
        None => (fallback, CoordinateSource::RegionFallback),
    };

    Ok(StationReading {
        station_name: station_name.to_string(),
        value,
        raw_value: raw_value.to_string(),
        data_time: reading
            .data_time
            .clone()
            .unwrap_or_else(|| NO_TIME_PLACEHOLDER.to_string()),
        coordinate,
        coordinate_source,
        band: classify_pm10(value),
    })
}

/// Aggregates one fetch cycle.
///
/// Records that cannot be parsed are collected in `failures` and skipped;
/// they still count toward `station_count`. Only values strictly above zero
/// contribute to `valid_count` and `mean_pm10`.
///
/// Returns `AggregateError::NoData` for an empty sequence so callers can
/// tell "nothing reported" apart from a zero average.
pub fn aggregate(
    readings: &[RawReading],
    coordinates: &CoordinateMap,
    fallback: Coordinate,
) -> Result<AggregateResult, AggregateError> {
    let first = readings.first().ok_or(AggregateError::NoData)?;

    let mut stations = Vec::with_capacity(readings.len());
    let mut failures = Vec::new();
    let mut valid_count = 0usize;
    let mut total_pm10 = 0.0f64;

    for (index, reading) in readings.iter().enumerate() {
        match build_station_reading(reading, coordinates, fallback) {
            Ok(station) => {
                if station.is_valid() {
                    valid_count += 1;
                    total_pm10 += station.value;
                }
                stations.push(station);
            }
            Err(reason) => {
                let failure = RecordFailure {
                    index,
                    station_name: reading.station_name.clone(),
                    reason,
                };
                tracing::warn!(index, station = ?failure.station_name, "{}", failure);
                failures.push(failure);
            }
        }
    }

    let mean_pm10 = if valid_count > 0 {
        total_pm10 / valid_count as f64
    } else {
        0.0
    };

    let latest_timestamp = first
        .data_time
        .clone()
        .unwrap_or_else(|| NO_TIME_PLACEHOLDER.to_string());

    let later = readings
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(i, r)| r.data_time.as_deref().map(|t| (i, t)));
    if let Some((index, newer)) = timestamps::find_newer_than_first(&latest_timestamp, later) {
        tracing::warn!(
            first = %latest_timestamp,
            index,
            newer,
            "feed is not ordered newest-first; reporting the first record's time"
        );
    }

    Ok(AggregateResult {
        stations,
        failures,
        station_count: readings.len(),
        valid_count,
        mean_pm10,
        latest_timestamp,
    })
}
