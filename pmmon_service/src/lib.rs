//! Real-time PM10 monitoring for Korean administrative regions.
//!
//! Fetches station coordinates and real-time particulate readings from the
//! AirKorea Open API, joins and classifies them, and renders a colored
//! marker map with a regional summary.

pub mod analysis;
pub mod config;
pub mod dev_mode;
pub mod grading;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod present;
pub mod regions;
pub mod resolver;
pub mod session;
pub mod verify;

pub use analysis::aggregate::aggregate;
pub use config::Config;
pub use grading::thresholds::{AirQualityBand, classify_pm10};
pub use ingest::AirQualitySource;
pub use model::{AggregateError, AggregateResult, Coordinate, CoordinateMap, FetchError, RawReading};
pub use session::{PipelineError, Session, Snapshot, UpdateReport};
