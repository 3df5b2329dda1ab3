//! Service configuration.
//!
//! Settings come from an optional TOML file; anything absent takes its
//! default. The AirKorea service key is normally supplied through the
//! environment (`AIRKOREA_SERVICE_KEY`, optionally via `.env`) so it does
//! not need to live in the config file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable that overrides `api.service_key`.
pub const SERVICE_KEY_ENV: &str = "AIRKOREA_SERVICE_KEY";

/// Config file looked up when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "pmmon.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("No AirKorea service key configured; set AIRKOREA_SERVICE_KEY or api.service_key")]
    MissingServiceKey,
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub logging: LoggingConfig,
}

/// AirKorea endpoint settings. Page size and format are fixed per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub station_list_url: String,
    pub realtime_url: String,
    pub service_key: Option<String>,
    pub page_no: u32,
    pub num_of_rows: u32,
    pub return_type: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            station_list_url: "http://apis.data.go.kr/B552584/MsrstnInfoInqireSvc/getMsrstnList"
                .to_string(),
            realtime_url:
                "http://apis.data.go.kr/B552584/ArpltnInforInqireSvc/getCtprvnRltmMesureDnsty"
                    .to_string(),
            service_key: None,
            page_no: 1,
            num_of_rows: 100,
            return_type: "JSON".to_string(),
            api_version: "1.3".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// The configured service key, or `MissingServiceKey`.
    pub fn require_service_key(&self) -> Result<&str, ConfigError> {
        self.service_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingServiceKey)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub default_region: String,
    pub width: u32,
    pub height: u32,
    /// HTML file written after each successful update.
    pub output: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 11,
            default_region: crate::regions::DEFAULT_REGION.to_string(),
            width: 700,
            height: 500,
            output: "pm10_map.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"pmmon_service=debug"`.
    pub level: String,
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), log_file: None }
    }
}

impl Config {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists (defaults otherwise), then applies the
    /// environment override for the service key.
    ///
    /// A missing file is only an error when `required` is set, i.e. when
    /// the user named the file explicitly.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = if path.exists() || required {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&text, &path.display().to_string())?
        } else {
            Config::default()
        };

        if let Ok(key) = std::env::var(SERVICE_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api.service_key = Some(key);
            }
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.num_of_rows == 0 {
            return Err(ConfigError::Invalid("api.num_of_rows must be positive".into()));
        }
        if crate::regions::find_region(&self.map.default_region).is_none() {
            return Err(ConfigError::Invalid(format!(
                "map.default_region '{}' is not a known region",
                self.map.default_region
            )));
        }
        Ok(())
    }
}
