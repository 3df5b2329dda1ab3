/// AirKorea (한국환경공단) Open API client
///
/// Two services are used, both published on data.go.kr:
/// - Station directory (`MsrstnInfoInqireSvc/getMsrstnList`): station names
///   and positions for an address prefix.
/// - Real-time concentrations by province
///   (`ArpltnInforInqireSvc/getCtprvnRltmMesureDnsty`): latest PM10 per station.
///
/// Both wrap their payload as `response.header` + `response.body.items[]`.
/// URL construction and response parsing are pure functions so they can be
/// tested against recorded bodies; `AirKoreaClient` only adds the transport.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{ApiConfig, ConfigError};
use crate::ingest::AirQualitySource;
use crate::model::{Coordinate, CoordinateMap, FetchError, RawReading};
use crate::regions::Region;

/// Result code the service returns on success.
const RESULT_OK: &str = "00";

// ============================================================================
// Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: ResponseNode<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseNode<T> {
    header: Option<ResponseHeader>,
    body: Option<ResponseBody<T>>,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct ResponseBody<T> {
    items: Option<Vec<T>>,
}

/// A JSON value that the service sometimes sends as a string and
/// sometimes as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }

    fn to_f64(&self) -> Result<f64, String> {
        match self {
            Scalar::Number(n) => Ok(*n),
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("'{}' is not a number: {}", s, e)),
        }
    }
}

/// One entry of the station directory.
#[derive(Debug, Deserialize)]
struct StationListItem {
    #[serde(rename = "stationName")]
    station_name: Option<String>,
    #[serde(rename = "dmX")]
    dm_x: Option<Scalar>,
    #[serde(rename = "dmY")]
    dm_y: Option<Scalar>,
}

/// A directory position in the order the directory pairs it:
/// longitude (`dmY`) first, then latitude (`dmX`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPosition(pub f64, pub f64);

impl RawPosition {
    /// Swaps into latitude-first order.
    pub fn to_coordinate(self) -> Coordinate {
        let RawPosition(longitude, latitude) = self;
        Coordinate::new(latitude, longitude)
    }
}

// ============================================================================
// URL Construction
// ============================================================================

/// Station-directory URL for a region label.
///
/// Every query value is percent-encoded; service keys routinely contain
/// `+`, `/` and `=`.
pub fn build_station_list_url(api: &ApiConfig, region_name: &str, service_key: &str) -> String {
    format!(
        "{}?addr={}&pageNo={}&numOfRows={}&returnType={}&serviceKey={}",
        api.station_list_url,
        urlencoding::encode(region_name),
        api.page_no,
        api.num_of_rows,
        urlencoding::encode(&api.return_type),
        urlencoding::encode(service_key),
    )
}

/// Real-time concentration URL for a region label.
pub fn build_realtime_url(api: &ApiConfig, region_name: &str, service_key: &str) -> String {
    format!(
        "{}?sidoName={}&pageNo={}&numOfRows={}&returnType={}&serviceKey={}&ver={}",
        api.realtime_url,
        urlencoding::encode(region_name),
        api.page_no,
        api.num_of_rows,
        urlencoding::encode(&api.return_type),
        urlencoding::encode(service_key),
        urlencoding::encode(&api.api_version),
    )
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Unwraps the common envelope, checking the result code when present.
fn parse_items<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Vec<T>, FetchError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    let node = envelope.response;

    if let Some(header) = node.header {
        if header.result_code != RESULT_OK {
            return Err(FetchError::Api {
                code: header.result_code,
                message: header.result_msg,
            });
        }
    }

    let body = node
        .body
        .ok_or_else(|| FetchError::Parse("response has no body".to_string()))?;
    Ok(body.items.unwrap_or_default())
}

/// Parses a station-directory body into directory-ordered positions.
///
/// Stations with a blank or missing `dmX`/`dmY` are skipped. A position
/// that is present but not numeric fails the whole response.
pub fn parse_station_positions(body: &str) -> Result<HashMap<String, RawPosition>, FetchError> {
    let items: Vec<StationListItem> = parse_items(body)?;

    let mut positions = HashMap::with_capacity(items.len());
    for item in items {
        let (Some(name), Some(dm_x), Some(dm_y)) = (item.station_name, item.dm_x, item.dm_y) else {
            continue;
        };
        if dm_x.is_blank() || dm_y.is_blank() {
            continue;
        }
        let latitude = dm_x
            .to_f64()
            .map_err(|e| FetchError::Parse(format!("dmX for {}: {}", name, e)))?;
        let longitude = dm_y
            .to_f64()
            .map_err(|e| FetchError::Parse(format!("dmY for {}: {}", name, e)))?;
        positions.insert(name, RawPosition(longitude, latitude));
    }
    Ok(positions)
}

/// Converts directory positions to latitude-first coordinates.
pub fn convert_positions(positions: HashMap<String, RawPosition>) -> CoordinateMap {
    positions
        .into_iter()
        .map(|(name, pos)| (name, pos.to_coordinate()))
        .collect()
}

/// Parses a real-time body into readings, preserving feed order.
///
/// Items are read field by field so that one oddly typed record does not
/// fail the batch; the aggregator reports it as a record failure instead.
pub fn parse_realtime_response(body: &str) -> Result<Vec<RawReading>, FetchError> {
    let items: Vec<serde_json::Value> = parse_items(body)?;
    Ok(items.iter().map(reading_from_item).collect())
}

/// Lenient conversion of one real-time item.
///
/// A numeric `pm10Value` is kept as its decimal text. Any other non-string,
/// non-null value is kept as raw JSON text, which the aggregator rejects.
fn reading_from_item(item: &serde_json::Value) -> RawReading {
    let text = |key: &str| item.get(key).and_then(|v| v.as_str()).map(str::to_string);
    let pm10_value = match item.get("pm10Value") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };
    RawReading {
        station_name: text("stationName"),
        pm10_value,
        data_time: text("dataTime"),
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Blocking client for the live AirKorea endpoints.
pub struct AirKoreaClient {
    client: reqwest::blocking::Client,
    api: ApiConfig,
    service_key: String,
}

impl AirKoreaClient {
    /// Builds a client from configuration. Fails if no service key is set.
    pub fn new(api: ApiConfig) -> Result<Self, ConfigError> {
        let service_key = api.require_service_key()?.to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(format!("pmmon/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;
        Ok(Self { client, api, service_key })
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }
        Ok(response.text()?)
    }
}

impl AirQualitySource for AirKoreaClient {
    fn station_coordinates(&self, region: &Region) -> Result<CoordinateMap, FetchError> {
        let url = build_station_list_url(&self.api, region.name, &self.service_key);
        tracing::debug!(region = region.name, "requesting station directory");
        let body = self.get_text(&url)?;
        Ok(convert_positions(parse_station_positions(&body)?))
    }

    fn realtime_readings(&self, region: &Region) -> Result<Vec<RawReading>, FetchError> {
        let url = build_realtime_url(&self.api, region.name, &self.service_key);
        tracing::debug!(region = region.name, "requesting real-time readings");
        let body = self.get_text(&url)?;
        parse_realtime_response(&body)
    }

    fn label(&self) -> &'static str {
        "AirKorea"
    }
}

// ============================================================================
// Tests
// ============================================================================
