use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::types::{ScanSettings, ServiceSettings};
use crate::capture::sampler::{JPEG_QUALITY, MAX_EDGE};
use crate::capture::types::{CaptureConfiguration, FacingMode, Resolution};
use crate::error_handling::types::ConfigError;

/// Application configuration, read from a TOML file.
///
/// # Examples
///
/// ```no_run
/// use medscan::configuration::config::Config;
/// use std::path::Path;
///
/// let config = Config::from_file(Path::new("medscan.toml"))?;
/// println!("Scanning against {}", config.service.endpoint);
/// # Ok::<(), medscan::error_handling::types::ConfigError>(())
/// ```
///
/// # Fields Overview
///
/// - `service`: the remote identification endpoint and its credentials
/// - `scan`: timing and sizing of the scan loop
/// - `capture`: optional replacement of the default capture priority list
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub service: ServiceSection,

    #[serde(default)]
    pub scan: ScanSection,

    /// Ordered capture configurations. `None` keeps the built-in list
    /// (environment exact, environment relaxed, user, any).
    #[serde(default)]
    pub capture: Option<Vec<CaptureEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Full URL of the scan endpoint, e.g. `https://api.example.org/api/v1/scan`.
    pub endpoint: String,

    /// Bearer token sent with every identification request.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Whole-request timeout for one identification call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    /// Locale forwarded to the service (`language` query parameter) and
    /// used to resolve guidance text.
    pub locale: String,

    /// Analysis ticks allowed before the session fails.
    ///
    /// Must be between 1 and 50 included.
    pub max_attempts: u32,

    /// Delay between the end of one tick and the start of the next.
    pub tick_interval_ms: u64,

    /// Bound on the wait for the stream's first playable metadata.
    pub metadata_timeout_secs: u64,

    /// Pause between stream readiness and the first tick, for autofocus.
    pub settle_delay_ms: u64,

    /// Longest edge of a submitted frame, in pixels.
    pub max_edge: u32,

    /// JPEG quality on a 0..=1 scale.
    pub jpeg_quality: f32,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            locale: "fr".to_string(),
            max_attempts: 10,
            tick_interval_ms: 3000,
            metadata_timeout_secs: 10,
            settle_delay_ms: 600,
            max_edge: MAX_EDGE,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureEntry {
    pub label: String,
    #[serde(default)]
    pub facing: Option<FacingMode>,
    #[serde(default)]
    pub exact: bool,
    pub ideal_width: u32,
    pub ideal_height: u32,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
}

impl From<&CaptureEntry> for CaptureConfiguration {
    fn from(entry: &CaptureEntry) -> Self {
        let max = match (entry.max_width, entry.max_height) {
            (Some(width), Some(height)) => Some(Resolution::new(width, height)),
            _ => None,
        };
        CaptureConfiguration {
            label: entry.label.clone(),
            facing: entry.facing,
            ideal: Resolution::new(entry.ideal_width, entry.ideal_height),
            max,
            exact: entry.exact,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::NotInRange(format!(
            "{} = {} (expected {}..={})",
            name, value, min, max
        )));
    }
    Ok(())
}

impl Config {
    /// Reads and validates the TOML file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses and validates TOML content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.service.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::BadEndpoint(format!(
                "{} is not an http(s) URL",
                self.service.endpoint
            )));
        }
        check_range(
            "service.request_timeout_secs",
            self.service.request_timeout_secs,
            1,
            300,
        )?;

        let scan = &self.scan;
        if scan.locale.trim().is_empty() {
            return Err(ConfigError::NotInRange(
                "scan.locale must not be empty".to_string(),
            ));
        }
        check_range("scan.max_attempts", scan.max_attempts, 1, 50)?;
        check_range("scan.tick_interval_ms", scan.tick_interval_ms, 100, 60_000)?;
        check_range("scan.metadata_timeout_secs", scan.metadata_timeout_secs, 1, 120)?;
        check_range("scan.settle_delay_ms", scan.settle_delay_ms, 0, 10_000)?;
        check_range("scan.max_edge", scan.max_edge, 64, 4096)?;
        if !(scan.jpeg_quality > 0.0 && scan.jpeg_quality <= 1.0) {
            return Err(ConfigError::NotInRange(format!(
                "scan.jpeg_quality = {} (expected 0 < q <= 1)",
                scan.jpeg_quality
            )));
        }

        if let Some(entries) = &self.capture {
            if entries.is_empty() {
                return Err(ConfigError::CapturesEmpty);
            }
            for entry in entries {
                check_range(
                    &format!("capture.{}.ideal_width", entry.label),
                    entry.ideal_width,
                    1,
                    8192,
                )?;
                check_range(
                    &format!("capture.{}.ideal_height", entry.label),
                    entry.ideal_height,
                    1,
                    8192,
                )?;
            }
        }
        Ok(())
    }

    /// Applies command line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        endpoint: Option<String>,
        locale: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(endpoint) = endpoint {
            self.service.endpoint = endpoint;
        }
        if let Some(locale) = locale {
            self.scan.locale = locale;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            endpoint: self.service.endpoint.trim().to_string(),
            auth_token: self.service.auth_token.clone(),
            request_timeout: Duration::from_secs(self.service.request_timeout_secs),
        }
    }

    pub fn scan_settings(&self) -> ScanSettings {
        let capture_configurations = match &self.capture {
            Some(entries) => entries.iter().map(CaptureConfiguration::from).collect(),
            None => CaptureConfiguration::default_priority_list(),
        };
        ScanSettings {
            locale: self.scan.locale.clone(),
            max_attempts: self.scan.max_attempts,
            tick_interval: Duration::from_millis(self.scan.tick_interval_ms),
            metadata_timeout: Duration::from_secs(self.scan.metadata_timeout_secs),
            settle_delay: Duration::from_millis(self.scan.settle_delay_ms),
            max_edge: self.scan.max_edge,
            jpeg_quality: self.scan.jpeg_quality,
            capture_configurations,
        }
    }
}
