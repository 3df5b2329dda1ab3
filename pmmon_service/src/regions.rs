/// Region registry for the PM10 monitoring service.
///
/// Defines the fixed set of administrative regions the AirKorea API can be
/// queried for, each with the canonical coordinate used as the map center
/// and as the fallback marker position for stations the directory does not
/// locate. This is the single source of truth for region names. Other
/// modules should look regions up here rather than hardcoding labels.

use crate::model::Coordinate;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for one administrative region.
#[derive(Debug, PartialEq)]
pub struct Region {
    /// Korean label. This is the value the API expects for `addr`/`sidoName`.
    pub name: &'static str,
    /// Romanized name, accepted on the command line and used for fixture files.
    pub english_name: &'static str,
    /// Map center and fallback marker location.
    pub center: Coordinate,
}

impl Region {
    /// Lowercase ASCII slug, e.g. `"daegu"`.
    pub fn slug(&self) -> String {
        self.english_name.to_ascii_lowercase()
    }
}

/// Region selected when the user has not chosen one.
pub const DEFAULT_REGION: &str = "대구";

/// All regions, in the order they are offered for selection.
pub static REGION_REGISTRY: &[Region] = &[
    Region { name: "서울", english_name: "Seoul", center: Coordinate::new(37.5665, 126.9780) },
    Region { name: "대구", english_name: "Daegu", center: Coordinate::new(35.8667, 128.6000) },
    Region { name: "부산", english_name: "Busan", center: Coordinate::new(35.1796, 129.0756) },
    Region { name: "인천", english_name: "Incheon", center: Coordinate::new(37.4563, 126.7052) },
    Region { name: "광주", english_name: "Gwangju", center: Coordinate::new(35.1595, 126.8526) },
    Region { name: "대전", english_name: "Daejeon", center: Coordinate::new(36.3504, 127.3845) },
    Region { name: "울산", english_name: "Ulsan", center: Coordinate::new(35.5384, 129.3114) },
    Region { name: "경기", english_name: "Gyeonggi", center: Coordinate::new(37.4138, 127.5183) },
    Region { name: "강원", english_name: "Gangwon", center: Coordinate::new(37.8228, 128.1555) },
    Region { name: "충북", english_name: "Chungbuk", center: Coordinate::new(36.8, 127.7) },
    Region { name: "충남", english_name: "Chungnam", center: Coordinate::new(36.5, 126.8) },
    Region { name: "전북", english_name: "Jeonbuk", center: Coordinate::new(35.7, 127.1) },
    Region { name: "전남", english_name: "Jeonnam", center: Coordinate::new(34.8, 126.9) },
    Region { name: "경북", english_name: "Gyeongbuk", center: Coordinate::new(36.4, 128.9) },
    Region { name: "경남", english_name: "Gyeongnam", center: Coordinate::new(35.4, 128.3) },
    Region { name: "제주", english_name: "Jeju", center: Coordinate::new(33.4996, 126.5312) },
    Region { name: "세종", english_name: "Sejong", center: Coordinate::new(36.4800, 127.2890) },
];

/// Looks up a region by Korean label or English name (case-insensitive).
/// Surrounding whitespace is ignored. Returns `None` if not found.
pub fn find_region(query: &str) -> Option<&'static Region> {
    let query = query.trim();
    REGION_REGISTRY
        .iter()
        .find(|r| r.name == query || r.english_name.eq_ignore_ascii_case(query))
}

/// The region selected by default.
pub fn default_region() -> &'static Region {
    find_region(DEFAULT_REGION).unwrap_or(&REGION_REGISTRY[0])
}

/// Korean labels of all regions, in registry order.
pub fn all_region_names() -> Vec<&'static str> {
    REGION_REGISTRY.iter().map(|r| r.name).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_seventeen_regions() {
        assert_eq!(REGION_REGISTRY.len(), 17);
        assert_eq!(all_region_names().len(), 17);
    }

    #[test]
    fn test_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for region in REGION_REGISTRY {
            assert!(seen.insert(region.name), "duplicate label '{}'", region.name);
            assert!(
                seen.insert(region.english_name),
                "duplicate english name '{}'",
                region.english_name
            );
        }
    }

    #[test]
    fn test_centers_lie_within_south_korea() {
        // Rough bounding box; a swapped lat/lon pair would land far outside.
        for region in REGION_REGISTRY {
            let c = region.center;
            assert!(
                (33.0..=39.0).contains(&c.latitude),
                "latitude out of range for '{}': {}",
                region.name,
                c.latitude
            );
            assert!(
                (124.0..=132.0).contains(&c.longitude),
                "longitude out of range for '{}': {}",
                region.name,
                c.longitude
            );
        }
    }

    #[test]
    fn test_find_region_accepts_korean_and_english() {
        let by_label = find_region("대구").expect("대구 should be in registry");
        let by_english = find_region("daegu").expect("daegu should match case-insensitively");
        assert_eq!(by_label, by_english);
        assert_eq!(by_label.center, Coordinate::new(35.8667, 128.6000));
        assert!(find_region("  Seoul ").is_some());
    }

    #[test]
    fn test_find_region_returns_none_for_unknown_label() {
        assert!(find_region("평양").is_none());
        assert!(find_region("").is_none());
    }

    #[test]
    fn test_default_region_is_daegu() {
        assert_eq!(default_region().name, "대구");
    }

    #[test]
    fn test_slug_is_lowercase_ascii() {
        assert_eq!(find_region("경북").unwrap().slug(), "gyeongbuk");
    }
}
