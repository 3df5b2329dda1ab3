//! Terminal rendering of an aggregate.

use comfy_table::{ContentArrangement, Table, presets};

use super::{Metric, format_pm10, marker_color};
use crate::model::{AggregateResult, CoordinateSource};

/// One row per displayed station, in feed order.
pub fn station_table(result: &AggregateResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["측정소", "미세먼지", "등급", "색상", "측정시간", "위치"]);

    for station in &result.stations {
        let position = match station.coordinate_source {
            CoordinateSource::Directory => format!(
                "{:.4}, {:.4}",
                station.coordinate.latitude, station.coordinate.longitude
            ),
            CoordinateSource::RegionFallback => "지역 중심".to_string(),
        };
        table.add_row(vec![
            station.station_name.clone(),
            format_pm10(station.value),
            station.band.label().to_string(),
            marker_color(station.band).as_str().to_string(),
            station.data_time.clone(),
            position,
        ]);
    }
    table
}

/// `label: value` lines for the summary panel.
pub fn metrics_lines(metrics: &[Metric]) -> String {
    metrics
        .iter()
        .map(|m| format!("{}: {}", m.label, m.value))
        .collect::<Vec<_>>()
        .join("\n")
}
