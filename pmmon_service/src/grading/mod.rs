/// Air-quality grading.
///
/// Submodules:
/// - `thresholds` — PM10 band thresholds and classification.

pub mod thresholds;
