//! Data Source Verification Module
//!
//! Exercises both AirKorea endpoints for each region and records which
//! ones respond and how much usable data they return. Run this after
//! changing the service key or endpoint URLs.

use chrono::Utc;
use serde::Serialize;

use crate::analysis::aggregate::parse_pm10;
use crate::ingest::AirQualitySource;
use crate::regions::Region;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub source: String,
    pub results: Vec<RegionVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionVerification {
    pub region: String,
    pub status: VerificationStatus,
    /// Stations the directory returned with a usable position.
    pub stations_listed: usize,
    /// Readings whose station name matched a directory entry.
    pub stations_located: usize,
    pub readings_returned: usize,
    /// Readings with a parsed value above zero.
    pub valid_readings: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Both endpoints answered and at least one reading is valid.
    Success,
    /// Readings are available but something is degraded: the directory
    /// failed, or no reading carries a value.
    PartialSuccess,
    Failed,
}

// ============================================================================
// Region Verification
// ============================================================================

pub fn verify_region(source: &dyn AirQualitySource, region: &Region) -> RegionVerification {
    let mut result = RegionVerification {
        region: region.name.to_string(),
        status: VerificationStatus::Failed,
        stations_listed: 0,
        stations_located: 0,
        readings_returned: 0,
        valid_readings: 0,
        error_message: None,
    };

    // Test 1: station directory
    let coordinates = match source.station_coordinates(region) {
        Ok(coordinates) => {
            result.stations_listed = coordinates.len();
            Some(coordinates)
        }
        Err(e) => {
            result.error_message = Some(format!("Station directory failed: {}", e));
            None
        }
    };

    // Test 2: real-time readings
    match source.realtime_readings(region) {
        Ok(readings) => {
            result.readings_returned = readings.len();
            for reading in &readings {
                let located = match (&coordinates, &reading.station_name) {
                    (Some(map), Some(name)) => map.contains_key(name),
                    _ => false,
                };
                if located {
                    result.stations_located += 1;
                }
                let valid = reading
                    .pm10_value
                    .as_deref()
                    .and_then(|v| parse_pm10(v).ok())
                    .is_some_and(|v| v > 0.0);
                if valid {
                    result.valid_readings += 1;
                }
            }
        }
        Err(e) => {
            let message = format!("Real-time readings failed: {}", e);
            result.error_message = Some(match result.error_message.take() {
                Some(previous) => format!("{}; {}", previous, message),
                None => message,
            });
            return result;
        }
    }

    result.status = if result.readings_returned == 0 {
        if result.error_message.is_none() {
            result.error_message = Some("No readings returned".to_string());
        }
        VerificationStatus::Failed
    } else if coordinates.is_some() && result.valid_readings > 0 {
        VerificationStatus::Success
    } else {
        VerificationStatus::PartialSuccess
    };

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_verification(source: &dyn AirQualitySource, regions: &[&Region]) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        source: source.label().to_string(),
        results: Vec::with_capacity(regions.len()),
        summary: VerificationSummary { total: regions.len(), ..Default::default() },
    };

    for region in regions {
        let result = verify_region(source, region);
        match result.status {
            VerificationStatus::Success | VerificationStatus::PartialSuccess => {
                tracing::info!(
                    region = region.name,
                    status = ?result.status,
                    readings = result.readings_returned,
                    located = result.stations_located,
                    "region verified"
                );
                report.summary.working += 1;
            }
            VerificationStatus::Failed => {
                tracing::warn!(
                    region = region.name,
                    error = result.error_message.as_deref().unwrap_or("Unknown"),
                    "region verification failed"
                );
                report.summary.failed += 1;
            }
        }
        report.results.push(result);
    }

    report
}

/// Share of regions that are at least partially working, in percent.
pub fn success_rate(summary: &VerificationSummary) -> f64 {
    if summary.total > 0 {
        (summary.working as f64 / summary.total as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, CoordinateMap, FetchError, RawReading};
    use crate::regions::find_region;

    struct StubSource {
        directory: Result<CoordinateMap, FetchError>,
        readings: Result<Vec<RawReading>, FetchError>,
    }

    impl AirQualitySource for StubSource {
        fn station_coordinates(&self, _region: &Region) -> Result<CoordinateMap, FetchError> {
            self.directory.clone()
        }
        fn realtime_readings(&self, _region: &Region) -> Result<Vec<RawReading>, FetchError> {
            self.readings.clone()
        }
        fn label(&self) -> &'static str {
            "stub"
        }
    }

    fn directory() -> CoordinateMap {
        let mut map = CoordinateMap::new();
        map.insert("A".into(), Coordinate::new(1.0, 2.0));
        map
    }

    #[test]
    fn test_healthy_region_is_success() {
        let source = StubSource {
            directory: Ok(directory()),
            readings: Ok(vec![RawReading::new("A", "20", "T"), RawReading::new("B", "-", "T")]),
        };
        let result = verify_region(&source, find_region("대구").unwrap());
        assert_eq!(result.status, VerificationStatus::Success);
        assert_eq!(result.stations_listed, 1);
        assert_eq!(result.stations_located, 1);
        assert_eq!(result.readings_returned, 2);
        assert_eq!(result.valid_readings, 1);
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_directory_failure_is_partial() {
        let source = StubSource {
            directory: Err(FetchError::Http(500)),
            readings: Ok(vec![RawReading::new("A", "20", "T")]),
        };
        let result = verify_region(&source, find_region("대구").unwrap());
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert!(result.error_message.unwrap().contains("Station directory"));
    }

    #[test]
    fn test_reading_failure_is_failed_with_both_messages() {
        let source = StubSource {
            directory: Err(FetchError::Http(500)),
            readings: Err(FetchError::Transport("timeout".into())),
        };
        let result = verify_region(&source, find_region("대구").unwrap());
        assert_eq!(result.status, VerificationStatus::Failed);
        let message = result.error_message.unwrap();
        assert!(message.contains("Station directory") && message.contains("Real-time"));
    }

    #[test]
    fn test_empty_feed_is_failed() {
        let source = StubSource { directory: Ok(directory()), readings: Ok(vec![]) };
        let result = verify_region(&source, find_region("대구").unwrap());
        assert_eq!(result.status, VerificationStatus::Failed);
        assert_eq!(result.error_message.as_deref(), Some("No readings returned"));
    }

    #[test]
    fn test_report_summary_and_success_rate() {
        let source = StubSource {
            directory: Ok(directory()),
            readings: Ok(vec![RawReading::new("A", "20", "T")]),
        };
        let regions = [find_region("대구").unwrap(), find_region("서울").unwrap()];
        let report = run_verification(&source, &regions);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.working, 2);
        assert_eq!(success_rate(&report.summary), 100.0);
        assert_eq!(report.source, "stub");

        let json = serde_json::to_string(&report).expect("report serializes");
        assert!(json.contains("\"status\":\"Success\""));
    }
}
