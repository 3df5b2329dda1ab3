//! Station coordinate resolution with per-region memoization.
//!
//! The resolver never fails past its boundary: a transport or parse error
//! yields an empty mapping plus the error, so the caller can show it and
//! still place every marker at the region center.

use std::collections::HashMap;

use crate::ingest::AirQualitySource;
use crate::logging::{DataSource, log_fetch_failure};
use crate::model::{CoordinateMap, FetchError};
use crate::regions::Region;

/// Memoized station directories, keyed by region label.
///
/// Only successful lookups are stored, so a failed lookup is retried on
/// the next update instead of pinning an empty mapping.
#[derive(Debug, Default)]
pub struct CoordinateCache {
    entries: HashMap<String, CoordinateMap>,
}

impl CoordinateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, region: &str) -> Option<&CoordinateMap> {
        self.entries.get(region)
    }

    pub fn insert(&mut self, region: &str, coordinates: CoordinateMap) {
        self.entries.insert(region.to_string(), coordinates);
    }

    /// Drops every entry except `region`'s.
    pub fn retain_only(&mut self, region: &str) {
        self.entries.retain(|key, _| key == region);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a coordinate lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinates: CoordinateMap,
    /// Set when the lookup failed; `coordinates` is then empty.
    pub error: Option<FetchError>,
    pub from_cache: bool,
}

/// Resolves station coordinates for `region`, consulting `cache` first.
pub fn resolve_station_coordinates(
    source: &dyn AirQualitySource,
    cache: &mut CoordinateCache,
    region: &Region,
) -> Resolution {
    if let Some(coordinates) = cache.get(region.name) {
        tracing::debug!(region = region.name, stations = coordinates.len(), "coordinate cache hit");
        return Resolution {
            coordinates: coordinates.clone(),
            error: None,
            from_cache: true,
        };
    }

    match source.station_coordinates(region) {
        Ok(coordinates) => {
            tracing::debug!(
                region = region.name,
                stations = coordinates.len(),
                source = source.label(),
                "station directory loaded"
            );
            cache.insert(region.name, coordinates.clone());
            Resolution { coordinates, error: None, from_cache: false }
        }
        Err(err) => {
            log_fetch_failure(DataSource::StationDirectory, region.name, "station directory", &err);
            Resolution {
                coordinates: CoordinateMap::new(),
                error: Some(err),
                from_cache: false,
            }
        }
    }
}
