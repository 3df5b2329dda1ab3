/// Data ingestion for the PM10 monitoring service.
///
/// Submodules:
/// - `airkorea` — URL construction, response parsing, and the live HTTP
///   client for the AirKorea station-directory and real-time endpoints.
///
/// Everything downstream depends on `AirQualitySource` rather than on the
/// HTTP client, so the pipeline can be driven from recorded fixtures
/// (`dev_mode::FixtureSource`) as well as the live API.

pub mod airkorea;

use crate::model::{CoordinateMap, FetchError, RawReading};
use crate::regions::Region;

/// A provider of station coordinates and real-time readings for a region.
pub trait AirQualitySource {
    /// Station name → coordinate for every located station in `region`.
    fn station_coordinates(&self, region: &Region) -> Result<CoordinateMap, FetchError>;

    /// Current readings for `region`, in feed order.
    fn realtime_readings(&self, region: &Region) -> Result<Vec<RawReading>, FetchError>;

    /// Short label for log lines, e.g. `"AirKorea"`.
    fn label(&self) -> &'static str;
}
