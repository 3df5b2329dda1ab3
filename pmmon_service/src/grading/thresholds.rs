//! PM10 air-quality banding.
//!
//! Bands are checked from the most severe down using strict greater-than,
//! so a value sitting exactly on a threshold falls into the lower band.

use serde::Serialize;
use std::fmt;

/// Lower bound (exclusive) of the "moderate" band, in ㎍/㎥.
pub const MODERATE_ABOVE: f64 = 30.0;
/// Lower bound (exclusive) of the "poor" band, in ㎍/㎥.
pub const POOR_ABOVE: f64 = 50.0;
/// Lower bound (exclusive) of the "very poor" band, in ㎍/㎥.
pub const VERY_POOR_ABOVE: f64 = 80.0;

/// Air-quality severity bands, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AirQualityBand {
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl AirQualityBand {
    /// All bands, least severe first.
    pub const ALL: [AirQualityBand; 4] = [
        AirQualityBand::Good,
        AirQualityBand::Moderate,
        AirQualityBand::Poor,
        AirQualityBand::VeryPoor,
    ];

    /// Stable identifier, e.g. `"very-poor"`.
    pub fn as_str(self) -> &'static str {
        match self {
            AirQualityBand::Good => "good",
            AirQualityBand::Moderate => "moderate",
            AirQualityBand::Poor => "poor",
            AirQualityBand::VeryPoor => "very-poor",
        }
    }

    /// Korean label used on the map legend.
    pub fn label(self) -> &'static str {
        match self {
            AirQualityBand::Good => "좋음",
            AirQualityBand::Moderate => "보통",
            AirQualityBand::Poor => "나쁨",
            AirQualityBand::VeryPoor => "매우나쁨",
        }
    }

    /// Human-readable range, as printed on the legend.
    pub fn range_label(self) -> &'static str {
        match self {
            AirQualityBand::Good => "0-30㎍/㎥",
            AirQualityBand::Moderate => "31-50㎍/㎥",
            AirQualityBand::Poor => "51-80㎍/㎥",
            AirQualityBand::VeryPoor => "81㎍/㎥ 이상",
        }
    }
}

impl fmt::Display for AirQualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a PM10 concentration into its band.
///
/// Zero, negative, and sentinel-derived values are all `Good`.
pub fn classify_pm10(value: f64) -> AirQualityBand {
    if value > VERY_POOR_ABOVE {
        AirQualityBand::VeryPoor
    } else if value > POOR_ABOVE {
        AirQualityBand::Poor
    } else if value > MODERATE_ABOVE {
        AirQualityBand::Moderate
    } else {
        AirQualityBand::Good
    }
}
