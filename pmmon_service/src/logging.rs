/// Structured logging for the PM10 monitoring service
///
/// Installs a `tracing` subscriber (console, plus an optional append-only
/// log file) and provides helpers that log fetch failures and batch
/// summaries at a level chosen by classifying the failure.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::config::LoggingConfig;
use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Station directory (coordinates).
    StationDirectory,
    /// Real-time concentration feed.
    Realtime,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::StationDirectory => write!(f, "STATIONS"),
            DataSource::Realtime => write!(f, "REALTIME"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. fixture absent for a region in offline mode
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a fetch failure.
pub fn classify_failure(err: &FetchError) -> FailureType {
    match err {
        FetchError::Fixture(_) => FailureType::Expected,
        // Non-2xx, unreadable bodies and rejected keys point at the service
        // or at our configuration.
        FetchError::Http(_) | FetchError::Parse(_) | FetchError::Api { .. } => {
            FailureType::Unexpected
        }
        // Network blips are common on flaky links.
        FetchError::Transport(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Subscriber Setup
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; `verbose` forces
/// `debug`. Returns an error if the log file cannot be opened or a
/// subscriber is already installed.
pub fn init_logging(
    config: &LoggingConfig,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .with_ansi(false)
                .try_init()?;
        }
        None => builder.with_writer(std::io::stderr).try_init()?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a fetch failure with automatic classification.
pub fn log_fetch_failure(source: DataSource, region: &str, operation: &str, err: &FetchError) {
    let failure_type = classify_failure(err);
    match failure_type {
        FailureType::Expected => {
            tracing::debug!(%source, region, kind = %failure_type, "{} failed: {}", operation, err)
        }
        FailureType::Unexpected => {
            tracing::error!(%source, region, kind = %failure_type, "{} failed: {}", operation, err)
        }
        FailureType::Unknown => {
            tracing::warn!(%source, region, kind = %failure_type, "{} failed: {}", operation, err)
        }
    }
}

// ---------------------------------------------------------------------------
// Batch Summary Logging
// ---------------------------------------------------------------------------

/// Log how many records of one fetch were turned into markers.
pub fn log_batch_summary(region: &str, total: usize, successful: usize, failed: usize) {
    if failed == 0 {
        tracing::info!(region, total, "processed {}/{} records", successful, total);
    } else if successful == 0 {
        tracing::error!(region, total, failed, "no record of {} could be processed", total);
    } else {
        tracing::warn!(
            region,
            total,
            failed,
            "processed {}/{} records, {} failed",
            successful,
            total,
            failed
        );
    }
}
