//! Application context for the fetch → aggregate → render cycle.
//!
//! A `Session` holds the state that has to survive between user actions:
//! the region the held result belongs to, the last successful `Snapshot`,
//! and the station-coordinate memo cache. An update runs the whole cycle
//! to completion; a failed update leaves the held snapshot untouched.

use thiserror::Error;

use crate::analysis::aggregate::aggregate;
use crate::config::MapConfig;
use crate::ingest::AirQualitySource;
use crate::logging::{DataSource, log_batch_summary, log_fetch_failure};
use crate::model::{AggregateError, AggregateResult, FetchError, RawReading, RecordFailure};
use crate::present::{self, MapView, Metric};
use crate::regions::Region;
use crate::resolver::{CoordinateCache, resolve_station_coordinates};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an update cycle produced no new snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The reading fetch failed (transport or response shape).
    #[error("{region}: reading fetch failed: {source}")]
    Fetch {
        region: String,
        #[source]
        source: FetchError,
    },
    /// The fetch succeeded but returned zero stations.
    #[error("{region}: no readings returned")]
    NoData { region: String },
}

impl PipelineError {
    /// Text shown to the user in place of the map.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Fetch { region, source } => {
                format!("❌ {} 데이터를 가져오는데 실패했습니다. ({})", region, source)
            }
            PipelineError::NoData { region } => {
                format!("{} 지역에 측정 데이터가 없습니다.", region)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot and report
// ---------------------------------------------------------------------------

/// The last successful result, replaced wholesale on the next success.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub region: &'static Region,
    pub result: AggregateResult,
    pub view: MapView,
}

impl Snapshot {
    pub fn metrics(&self) -> [Metric; 2] {
        present::summary_metrics(self.region, &self.result)
    }
}

/// What a successful update wants the user to see.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub region: &'static Region,
    pub station_count: usize,
    /// Coordinate lookup failure; markers fell back to the region center.
    pub coordinate_error: Option<FetchError>,
    pub record_failures: Vec<RecordFailure>,
    pub coordinates_from_cache: bool,
}

impl UpdateReport {
    pub fn success_message(&self) -> String {
        format!(
            "✅ {} 지도가 업데이트되었습니다! (총 {}개 측정소)",
            self.region.name, self.station_count
        )
    }

    /// Non-fatal problems of this update, one line each.
    pub fn warnings(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.record_failures.len() + 1);
        if let Some(err) = &self.coordinate_error {
            lines.push(format!("측정소 좌표 API 오류: {}", err));
        }
        lines.extend(self.record_failures.iter().map(ToString::to_string));
        lines
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Fetches the real-time readings for `region`. No retry.
pub fn fetch_readings(
    source: &dyn AirQualitySource,
    region: &Region,
) -> Result<Vec<RawReading>, FetchError> {
    source.realtime_readings(region).inspect_err(|err| {
        log_fetch_failure(DataSource::Realtime, region.name, "real-time readings", err)
    })
}

/// Runs one complete cycle for `region` without touching any held state
/// other than the coordinate cache.
pub fn run_update(
    source: &dyn AirQualitySource,
    cache: &mut CoordinateCache,
    region: &'static Region,
    map: &MapConfig,
) -> Result<(Snapshot, UpdateReport), PipelineError> {
    let resolution = resolve_station_coordinates(source, cache, region);

    let readings = fetch_readings(source, region).map_err(|source| PipelineError::Fetch {
        region: region.name.to_string(),
        source,
    })?;

    let result = aggregate(&readings, &resolution.coordinates, region.center).map_err(
        |AggregateError::NoData| {
            tracing::warn!(region = region.name, "feed returned zero stations");
            PipelineError::NoData { region: region.name.to_string() }
        },
    )?;

    log_batch_summary(
        region.name,
        result.station_count,
        result.stations.len(),
        result.failures.len(),
    );

    let view = present::build_map_view(region, &result, map);
    let report = UpdateReport {
        region,
        station_count: result.station_count,
        coordinate_error: resolution.error,
        record_failures: result.failures.clone(),
        coordinates_from_cache: resolution.from_cache,
    };
    Ok((Snapshot { region, result, view }, report))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    map: MapConfig,
    coordinate_cache: CoordinateCache,
    current_region: Option<&'static Region>,
    snapshot: Option<Snapshot>,
}

impl Session {
    pub fn new(map: MapConfig) -> Self {
        Self {
            map,
            coordinate_cache: CoordinateCache::new(),
            current_region: None,
            snapshot: None,
        }
    }

    /// Region of the held snapshot, if any.
    pub fn current_region(&self) -> Option<&'static Region> {
        self.current_region
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn coordinate_cache(&self) -> &CoordinateCache {
        &self.coordinate_cache
    }

    /// An update runs on an explicit refresh, or when the selection differs
    /// from the region of the held snapshot.
    pub fn needs_update(&self, selected: &Region, refresh_requested: bool) -> bool {
        refresh_requested || self.current_region.is_none_or(|current| current != selected)
    }

    /// Brings the session up to date with `selected`.
    ///
    /// Returns `Ok(None)` when nothing had to be done. On error the held
    /// snapshot and current region are left as they were.
    pub fn update(
        &mut self,
        source: &dyn AirQualitySource,
        selected: &'static Region,
        refresh_requested: bool,
    ) -> Result<Option<UpdateReport>, PipelineError> {
        if !self.needs_update(selected, refresh_requested) {
            return Ok(None);
        }

        if self.current_region.is_some_and(|current| current != selected) {
            tracing::debug!(region = selected.name, "region changed; dropping other coordinate caches");
            self.coordinate_cache.retain_only(selected.name);
        }

        let (snapshot, report) = run_update(source, &mut self.coordinate_cache, selected, &self.map)?;
        self.snapshot = Some(snapshot);
        self.current_region = Some(selected);
        Ok(Some(report))
    }

    /// The summary panel: held result's figures, or placeholders.
    pub fn summary_metrics(&self) -> [Metric; 2] {
        match &self.snapshot {
            Some(snapshot) => snapshot.metrics(),
            None => present::placeholder_metrics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, CoordinateMap};
    use crate::regions::find_region;
    use std::cell::{Cell, RefCell};

    /// Scripted source: readings are popped per call, directory is fixed.
    struct ScriptedSource {
        readings: RefCell<Vec<Result<Vec<RawReading>, FetchError>>>,
        directory_calls: Cell<usize>,
    }

    impl ScriptedSource {
        fn new(mut script: Vec<Result<Vec<RawReading>, FetchError>>) -> Self {
            script.reverse();
            Self { readings: RefCell::new(script), directory_calls: Cell::new(0) }
        }
    }

    impl AirQualitySource for ScriptedSource {
        fn station_coordinates(&self, _region: &Region) -> Result<CoordinateMap, FetchError> {
            self.directory_calls.set(self.directory_calls.get() + 1);
            let mut map = CoordinateMap::new();
            map.insert("A".to_string(), Coordinate::new(10.0, 20.0));
            Ok(map)
        }

        fn realtime_readings(&self, _region: &Region) -> Result<Vec<RawReading>, FetchError> {
            self.readings.borrow_mut().pop().unwrap_or(Ok(vec![]))
        }

        fn label(&self) -> &'static str {
            "scripted"
        }
    }

    fn sample() -> Vec<RawReading> {
        vec![
            RawReading::new("A", "95", "2024-05-01 13:00"),
            RawReading::new("B", "-", "2024-05-01 13:00"),
            RawReading::new("C", "45", "2024-05-01 13:00"),
        ]
    }

    #[test]
    fn test_first_update_stores_snapshot() {
        let source = ScriptedSource::new(vec![Ok(sample())]);
        let mut session = Session::new(MapConfig::default());
        let daegu = find_region("대구").unwrap();

        let report = session.update(&source, daegu, false).unwrap().expect("should update");
        assert_eq!(report.station_count, 3);
        assert_eq!(report.success_message(), "✅ 대구 지도가 업데이트되었습니다! (총 3개 측정소)");

        let snapshot = session.snapshot().expect("snapshot held");
        assert_eq!(snapshot.result.mean_pm10, 70.0);
        assert_eq!(snapshot.view.markers.len(), 3);
        assert_eq!(session.current_region(), Some(daegu));
    }

    #[test]
    fn test_same_region_without_refresh_is_a_no_op() {
        let source = ScriptedSource::new(vec![Ok(sample())]);
        let mut session = Session::new(MapConfig::default());
        let daegu = find_region("대구").unwrap();

        session.update(&source, daegu, false).unwrap();
        assert_eq!(session.update(&source, daegu, false).unwrap(), None);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let source = ScriptedSource::new(vec![Ok(sample()), Err(FetchError::Http(500))]);
        let mut session = Session::new(MapConfig::default());
        let daegu = find_region("대구").unwrap();

        session.update(&source, daegu, false).unwrap();
        let before = session.snapshot().cloned();

        let err = session.update(&source, daegu, true).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(err.user_message().starts_with("❌ 대구"));
        assert_eq!(session.snapshot().cloned(), before);
    }

    #[test]
    fn test_failed_region_change_keeps_old_region_and_snapshot() {
        let source = ScriptedSource::new(vec![Ok(sample()), Err(FetchError::Transport("down".into()))]);
        let mut session = Session::new(MapConfig::default());
        let daegu = find_region("대구").unwrap();
        let seoul = find_region("서울").unwrap();

        session.update(&source, daegu, false).unwrap();
        assert!(session.update(&source, seoul, false).is_err());
        assert_eq!(session.current_region(), Some(daegu));
        assert_eq!(session.snapshot().unwrap().region, daegu);
        assert!(session.needs_update(seoul, false), "selection still pending");
    }

    #[test]
    fn test_empty_feed_is_no_data_not_zero_average() {
        let source = ScriptedSource::new(vec![Ok(vec![])]);
        let mut session = Session::new(MapConfig::default());
        let err = session.update(&source, find_region("제주").unwrap(), false).unwrap_err();
        assert_eq!(err, PipelineError::NoData { region: "제주".to_string() });
        assert_eq!(err.user_message(), "제주 지역에 측정 데이터가 없습니다.");
        assert!(session.snapshot().is_none());
        assert_eq!(session.summary_metrics()[0].value, "데이터 없음");
    }

    #[test]
    fn test_refresh_reuses_coordinates_and_region_change_drops_them() {
        let source = ScriptedSource::new(vec![Ok(sample()), Ok(sample()), Ok(sample())]);
        let mut session = Session::new(MapConfig::default());
        let daegu = find_region("대구").unwrap();
        let busan = find_region("부산").unwrap();

        session.update(&source, daegu, false).unwrap();
        let refreshed = session.update(&source, daegu, true).unwrap().unwrap();
        assert!(refreshed.coordinates_from_cache);
        assert_eq!(source.directory_calls.get(), 1);

        session.update(&source, busan, false).unwrap();
        assert_eq!(source.directory_calls.get(), 2);
        assert_eq!(session.coordinate_cache().len(), 1);
        assert!(session.coordinate_cache().get("부산").is_some());
    }

    #[test]
    fn test_report_collects_record_warnings() {
        let mut readings = sample();
        readings.push(RawReading::new("D", "bogus", "2024-05-01 13:00"));
        let source = ScriptedSource::new(vec![Ok(readings)]);
        let mut session = Session::new(MapConfig::default());

        let report = session.update(&source, find_region("대구").unwrap(), false).unwrap().unwrap();
        assert_eq!(report.station_count, 4);
        let warnings = report.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("D 데이터 처리 오류"));
    }

    #[test]
    fn test_summary_metrics_follow_snapshot() {
        let source = ScriptedSource::new(vec![Ok(sample())]);
        let mut session = Session::new(MapConfig::default());
        session.update(&source, find_region("대구").unwrap(), false).unwrap();
        let [mean, count] = session.summary_metrics();
        assert_eq!(mean.label, "대구 평균 미세먼지");
        assert_eq!(mean.value, "70.0 ㎍/㎥");
        assert_eq!(count.value, "3개");
    }
}
