/// Core data types for the PM10 monitoring service.
///
/// This module defines the shared domain model imported by all other modules:
/// coordinates, raw API records, joined station readings, the aggregate
/// produced for one fetch cycle, and the error types raised while fetching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::grading::thresholds::AirQualityBand;

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Display text used when a record carries no measurement time.
pub const NO_TIME_PLACEHOLDER: &str = "정보없음";

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A WGS84 position, always stored latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Station name → coordinate, as produced by the station directory.
pub type CoordinateMap = HashMap<String, Coordinate>;

/// Where a station's display coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinateSource {
    /// Found in the station directory.
    Directory,
    /// Station absent from the directory; placed at the region center.
    RegionFallback,
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One item of the real-time measurement response, exactly as delivered.
///
/// Every field is optional because the API emits `null` for stations that
/// are offline; whether that is fatal for the record is decided by the
/// aggregator, not by deserialization.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawReading {
    #[serde(rename = "stationName", default)]
    pub station_name: Option<String>,
    #[serde(rename = "pm10Value", default)]
    pub pm10_value: Option<String>,
    #[serde(rename = "dataTime", default)]
    pub data_time: Option<String>,
}

impl RawReading {
    pub fn new(station: &str, pm10: &str, time: &str) -> Self {
        Self {
            station_name: Some(station.to_string()),
            pm10_value: Some(pm10.to_string()),
            data_time: Some(time.to_string()),
        }
    }
}

/// A reading joined with its coordinate and classified into a band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReading {
    pub station_name: String,
    /// Parsed PM10 in ㎍/㎥; sentinel placeholders become 0.
    pub value: f64,
    pub raw_value: String,
    pub data_time: String,
    pub coordinate: Coordinate,
    pub coordinate_source: CoordinateSource,
    pub band: AirQualityBand,
}

impl StationReading {
    /// `true` when the value counts toward the regional mean.
    pub fn is_valid(&self) -> bool {
        self.value > 0.0
    }
}

/// A record that could not be turned into a `StationReading`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// Position of the record in the fetched sequence.
    pub index: usize,
    pub station_name: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.station_name {
            Some(name) => write!(f, "{} 데이터 처리 오류: {}", name, self.reason),
            None => write!(f, "record #{} 데이터 처리 오류: {}", self.index, self.reason),
        }
    }
}

/// Everything derived from one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Joined readings in input order. Failed records are absent.
    pub stations: Vec<StationReading>,
    pub failures: Vec<RecordFailure>,
    /// Length of the fetched sequence, independent of validity.
    pub station_count: usize,
    /// Number of readings strictly greater than zero.
    pub valid_count: usize,
    /// Mean over valid readings; exactly 0 when there are none.
    pub mean_pm10: f64,
    /// Timestamp of the first record in the feed.
    pub latest_timestamp: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding AirKorea responses.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The body was not JSON, or not the expected `response.body.items` shape.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The service answered with a non-success result code.
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },
    /// Offline fixture could not be read.
    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Http(status.as_u16()),
            None => FetchError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Raised by the aggregator when there is nothing to aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("No data: the reading sequence is empty")]
    NoData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_reading_tolerates_nulls_and_missing_fields() {
        let json = r#"{"stationName": "수창동", "pm10Value": null}"#;
        let reading: RawReading = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(reading.station_name.as_deref(), Some("수창동"));
        assert_eq!(reading.pm10_value, None);
        assert_eq!(reading.data_time, None);
    }

    #[test]
    fn test_record_failure_display_names_station_when_known() {
        let failure = RecordFailure {
            index: 3,
            station_name: Some("태전동".to_string()),
            reason: "invalid PM10 value 'abc'".to_string(),
        };
        assert!(failure.to_string().starts_with("태전동"));

        let anonymous = RecordFailure { station_name: None, ..failure };
        assert!(anonymous.to_string().contains("#3"));
    }

    #[test]
    fn test_fetch_error_messages_carry_category_prefix() {
        assert!(FetchError::Http(500).to_string().starts_with("HTTP error"));
        assert!(FetchError::Parse("x".into()).to_string().starts_with("Parse error"));
        assert!(FetchError::Transport("x".into()).to_string().starts_with("Transport error"));
    }
}
