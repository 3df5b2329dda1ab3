//! Presentation adapter.
//!
//! Turns an `AggregateResult` into what the map surface consumes: marker
//! descriptors (coordinate, color, popup, tooltip), the map view itself,
//! the two summary metrics, and the color legend. Nothing here makes
//! decisions of its own; the band already fixes the color.
//!
//! Submodules:
//! - `html` — renders a map view to a standalone Leaflet page.
//! - `table` — renders an aggregate as a terminal table.

pub mod html;
pub mod table;

use serde::Serialize;

use crate::config::MapConfig;
use crate::grading::thresholds::AirQualityBand;
use crate::model::{AggregateResult, Coordinate, StationReading};
use crate::regions::Region;

/// The four marker colors, one per band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Blue,
    Green,
    Orange,
    Red,
}

impl MarkerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerColor::Blue => "blue",
            MarkerColor::Green => "green",
            MarkerColor::Orange => "orange",
            MarkerColor::Red => "red",
        }
    }

    /// Korean color name used on the legend.
    pub fn label(self) -> &'static str {
        match self {
            MarkerColor::Blue => "파란색",
            MarkerColor::Green => "초록색",
            MarkerColor::Orange => "주황색",
            MarkerColor::Red => "빨간색",
        }
    }
}

pub fn marker_color(band: AirQualityBand) -> MarkerColor {
    match band {
        AirQualityBand::Good => MarkerColor::Blue,
        AirQualityBand::Moderate => MarkerColor::Green,
        AirQualityBand::Poor => MarkerColor::Orange,
        AirQualityBand::VeryPoor => MarkerColor::Red,
    }
}

/// Popup body for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub station: String,
    /// e.g. `"95.0㎍/㎥"`
    pub value: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub coordinate: Coordinate,
    pub color: MarkerColor,
    pub popup: Popup,
    pub tooltip: String,
}

/// Everything needed to draw the map for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub subtitle: String,
    pub markers: Vec<MarkerDescriptor>,
}

/// A labelled figure for the summary panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    pub band: AirQualityBand,
    pub color: MarkerColor,
}

impl LegendEntry {
    /// e.g. `"파란색: 좋음 (0-30㎍/㎥)"`
    pub fn describe(&self) -> String {
        format!("{}: {} ({})", self.color.label(), self.band.label(), self.band.range_label())
    }
}

/// Formats a concentration the way the popup shows it: at least one
/// decimal place, no rounding.
pub fn format_pm10(value: f64) -> String {
    format!("{:?}㎍/㎥", value)
}

pub fn build_marker(station: &StationReading) -> MarkerDescriptor {
    MarkerDescriptor {
        coordinate: station.coordinate,
        color: marker_color(station.band),
        popup: Popup {
            station: station.station_name.clone(),
            value: format_pm10(station.value),
            time: station.data_time.clone(),
        },
        tooltip: format!("{} 클릭하세요", station.station_name),
    }
}

/// Markers for every displayed station, in feed order.
pub fn build_markers(result: &AggregateResult) -> Vec<MarkerDescriptor> {
    result.stations.iter().map(build_marker).collect()
}

pub fn build_map_view(region: &Region, result: &AggregateResult, map: &MapConfig) -> MapView {
    MapView {
        center: region.center,
        zoom: map.zoom,
        width: map.width,
        height: map.height,
        title: format!("{} 미세먼지 현황", region.name),
        subtitle: format!("측정시간: {}", result.latest_timestamp),
        markers: build_markers(result),
    }
}

/// The mean and station-count metrics for a held result.
pub fn summary_metrics(region: &Region, result: &AggregateResult) -> [Metric; 2] {
    [
        Metric {
            label: format!("{} 평균 미세먼지", region.name),
            value: format!("{:.1} ㎍/㎥", result.mean_pm10),
        },
        Metric {
            label: "측정소 수".to_string(),
            value: format!("{}개", result.station_count),
        },
    ]
}

/// Metrics shown before any fetch has succeeded.
pub fn placeholder_metrics() -> [Metric; 2] {
    [
        Metric { label: "평균 미세먼지".to_string(), value: "데이터 없음".to_string() },
        Metric { label: "측정소 수".to_string(), value: "0개".to_string() },
    ]
}

pub fn legend() -> Vec<LegendEntry> {
    AirQualityBand::ALL
        .iter()
        .map(|&band| LegendEntry { band, color: marker_color(band) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoordinateSource, RawReading};
    use crate::regions::find_region;

    fn station(name: &str, value: f64, band: AirQualityBand) -> StationReading {
        StationReading {
            station_name: name.to_string(),
            value,
            raw_value: value.to_string(),
            data_time: "2024-05-01 13:00".to_string(),
            coordinate: Coordinate::new(35.87, 128.59),
            coordinate_source: CoordinateSource::Directory,
            band,
        }
    }

    #[test]
    fn test_each_band_has_its_own_color() {
        assert_eq!(marker_color(AirQualityBand::Good), MarkerColor::Blue);
        assert_eq!(marker_color(AirQualityBand::Moderate), MarkerColor::Green);
        assert_eq!(marker_color(AirQualityBand::Poor), MarkerColor::Orange);
        assert_eq!(marker_color(AirQualityBand::VeryPoor), MarkerColor::Red);
    }

    #[test]
    fn test_marker_popup_and_tooltip_text() {
        let marker = build_marker(&station("수창동", 95.0, AirQualityBand::VeryPoor));
        assert_eq!(marker.popup.station, "수창동");
        assert_eq!(marker.popup.value, "95.0㎍/㎥");
        assert_eq!(marker.popup.time, "2024-05-01 13:00");
        assert_eq!(marker.tooltip, "수창동 클릭하세요");
        assert_eq!(marker.color, MarkerColor::Red);
    }

    #[test]
    fn test_format_pm10_keeps_fraction() {
        assert_eq!(format_pm10(0.0), "0.0㎍/㎥");
        assert_eq!(format_pm10(37.5), "37.5㎍/㎥");
    }

    #[test]
    fn test_map_view_is_centered_on_region() {
        let region = find_region("대구").unwrap();
        let readings = vec![RawReading::new("A", "10", "2024-05-01 13:00")];
        let result = crate::analysis::aggregate::aggregate(
            &readings,
            &Default::default(),
            region.center,
        )
        .unwrap();

        let view = build_map_view(region, &result, &MapConfig::default());
        assert_eq!(view.center, region.center);
        assert_eq!(view.zoom, 11);
        assert_eq!(view.title, "대구 미세먼지 현황");
        assert_eq!(view.subtitle, "측정시간: 2024-05-01 13:00");
        assert_eq!(view.markers.len(), 1);
    }

    #[test]
    fn test_summary_metrics_format_mean_to_one_decimal() {
        let region = find_region("서울").unwrap();
        let result = AggregateResult {
            stations: vec![],
            failures: vec![],
            station_count: 25,
            valid_count: 3,
            mean_pm10: 41.666,
            latest_timestamp: "T".into(),
        };
        let [mean, count] = summary_metrics(region, &result);
        assert_eq!(mean.label, "서울 평균 미세먼지");
        assert_eq!(mean.value, "41.7 ㎍/㎥");
        assert_eq!(count.value, "25개");
    }

    #[test]
    fn test_placeholder_metrics() {
        let [mean, count] = placeholder_metrics();
        assert_eq!(mean.value, "데이터 없음");
        assert_eq!(count.value, "0개");
    }

    #[test]
    fn test_legend_lists_bands_in_ascending_severity() {
        let entries = legend();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].describe(), "파란색: 좋음 (0-30㎍/㎥)");
        assert_eq!(entries[3].color, MarkerColor::Red);
    }

    #[test]
    fn test_marker_color_serializes_as_css_name() {
        assert_eq!(serde_json::to_string(&MarkerColor::Orange).unwrap(), "\"orange\"");
    }
}
