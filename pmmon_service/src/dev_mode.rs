/// Development mode: replay recorded API responses
///
/// When the live AirKorea service is unavailable (or no service key is at
/// hand), point the service at a directory of recorded response bodies.
/// Files are looked up by region slug:
///
///   `{dir}/{slug}_stations.json` — station-directory response
///   `{dir}/{slug}_realtime.json` — real-time response
///
/// Bodies go through the same parsers as live responses.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::AirQualitySource;
use crate::ingest::airkorea::{convert_positions, parse_realtime_response, parse_station_positions};
use crate::model::{CoordinateMap, FetchError, RawReading};
use crate::regions::Region;

/// An `AirQualitySource` backed by recorded response files.
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn stations_path(&self, region: &Region) -> PathBuf {
        self.dir.join(format!("{}_stations.json", region.slug()))
    }

    pub fn realtime_path(&self, region: &Region) -> PathBuf {
        self.dir.join(format!("{}_realtime.json", region.slug()))
    }

    fn read(path: &Path) -> Result<String, FetchError> {
        fs::read_to_string(path).map_err(|e| FetchError::Fixture(format!("{}: {}", path.display(), e)))
    }
}

impl AirQualitySource for FixtureSource {
    fn station_coordinates(&self, region: &Region) -> Result<CoordinateMap, FetchError> {
        let body = Self::read(&self.stations_path(region))?;
        Ok(convert_positions(parse_station_positions(&body)?))
    }

    fn realtime_readings(&self, region: &Region) -> Result<Vec<RawReading>, FetchError> {
        let body = Self::read(&self.realtime_path(region))?;
        parse_realtime_response(&body)
    }

    fn label(&self) -> &'static str {
        "fixtures"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::find_region;

    #[test]
    fn test_fixture_paths_use_region_slug() {
        let source = FixtureSource::new("/data/replay");
        let region = find_region("대구").unwrap();
        assert_eq!(source.stations_path(region), PathBuf::from("/data/replay/daegu_stations.json"));
        assert_eq!(source.realtime_path(region), PathBuf::from("/data/replay/daegu_realtime.json"));
    }

    #[test]
    fn test_missing_fixture_is_a_fixture_error() {
        let source = FixtureSource::new("/definitely/not/a/dir");
        let err = source.realtime_readings(find_region("서울").unwrap()).unwrap_err();
        assert!(matches!(err, FetchError::Fixture(ref m) if m.contains("seoul_realtime.json")));
    }
}
