/// Reading analysis for the PM10 monitoring service.
///
/// This module turns one fetch cycle's raw readings and station
/// coordinates into the aggregate that the presentation layer draws.
///
/// Submodules:
/// - `aggregate` — join, classification, and regional summary statistics.
/// - `timestamps` — parsing of AirKorea measurement times.

pub mod aggregate;
pub mod timestamps;
