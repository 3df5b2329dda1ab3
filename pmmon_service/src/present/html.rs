//! Standalone HTML map page.
//!
//! The page loads Leaflet from its CDN and draws one circle marker per
//! station from a JSON blob embedded in the page. Popups are built with DOM
//! text nodes, so station names never reach the page as markup.

use askama::Template;

use super::{LegendEntry, MapView, Metric};

#[derive(Template)]
#[template(path = "map.html")]
struct MapPage<'a> {
    title: &'a str,
    subtitle: &'a str,
    width: u32,
    height: u32,
    metrics: &'a [Metric],
    legend: Vec<String>,
    notices: &'a [String],
    map_json: String,
}

/// Serializes `view` for embedding inside a `<script>` element.
fn script_safe_json(view: &MapView) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(view)?.replace('<', "\\u003c"))
}

/// Renders a complete page for `view`.
///
/// `notices` are shown above the map (e.g. per-record warnings of the
/// latest update).
pub fn render_map_page(
    view: &MapView,
    metrics: &[Metric],
    legend: &[LegendEntry],
    notices: &[String],
) -> Result<String, askama::Error> {
    let map_json = script_safe_json(view).map_err(|e| askama::Error::Custom(Box::new(e)))?;
    MapPage {
        title: &view.title,
        subtitle: &view.subtitle,
        width: view.width,
        height: view.height,
        metrics,
        legend: legend.iter().map(LegendEntry::describe).collect(),
        notices,
        map_json,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;
    use crate::present::{MarkerColor, MarkerDescriptor, Popup, legend};

    fn view_with_station(name: &str) -> MapView {
        MapView {
            center: Coordinate::new(35.8667, 128.6),
            zoom: 11,
            width: 700,
            height: 500,
            title: "대구 미세먼지 현황".to_string(),
            subtitle: "측정시간: 2024-05-01 13:00".to_string(),
            markers: vec![MarkerDescriptor {
                coordinate: Coordinate::new(35.875, 128.5867),
                color: MarkerColor::Green,
                popup: Popup {
                    station: name.to_string(),
                    value: "42.0㎍/㎥".to_string(),
                    time: "2024-05-01 13:00".to_string(),
                },
                tooltip: format!("{} 클릭하세요", name),
            }],
        }
    }

    #[test]
    fn test_page_contains_title_metrics_and_legend() {
        let metrics = [Metric { label: "측정소 수".into(), value: "1개".into() }];
        let html = render_map_page(&view_with_station("수창동"), &metrics, &legend(), &[])
            .expect("template should render");
        assert!(html.contains("대구 미세먼지 현황"));
        assert!(html.contains("측정소 수"));
        assert!(html.contains("1개"));
        assert!(html.contains("빨간색: 매우나쁨"));
        assert!(html.contains("\"color\":\"green\""));
        assert!(html.contains("width: 700px"));
    }

    #[test]
    fn test_station_names_cannot_close_the_script_element() {
        let html = render_map_page(&view_with_station("</script><b>x"), &[], &[], &[]).unwrap();
        assert!(!html.contains("</script><b>x"));
        assert!(html.contains("\\u003c/script>\\u003cb>x"));
    }

    #[test]
    fn test_comment_openers_in_station_names_are_escaped() {
        let html = render_map_page(&view_with_station("<!--<script>"), &[], &[], &[]).unwrap();
        assert!(!html.contains("<!--<script>"));
        assert!(html.contains("\\u003c!--\\u003cscript>"));
    }

    #[test]
    fn test_notices_are_escaped() {
        let notices = vec!["<i>bad</i> 데이터 처리 오류".to_string()];
        let html = render_map_page(&view_with_station("A"), &[], &[], &notices).unwrap();
        assert!(html.contains("&lt;i&gt;bad"));
        assert!(!html.contains("<i>bad"));
    }
}
