use std::time::Duration;

use crate::capture::sampler::{JPEG_QUALITY, MAX_EDGE};
use crate::capture::types::CaptureConfiguration;

/// Where and how to reach the identification service.
#[derive(Debug, PartialEq, Clone)]
pub struct ServiceSettings {
    pub endpoint: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

/// Runtime parameters of one scanning engine.
#[derive(Debug, PartialEq, Clone)]
pub struct ScanSettings {
    pub locale: String,
    pub max_attempts: u32,
    pub tick_interval: Duration,
    /// Bound on the wait for the first playable metadata of a stream.
    pub metadata_timeout: Duration,
    /// Pause after the stream is ready so autofocus and exposure settle.
    pub settle_delay: Duration,
    pub max_edge: u32,
    pub jpeg_quality: f32,
    pub capture_configurations: Vec<CaptureConfiguration>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            locale: "fr".to_string(),
            max_attempts: 10,
            tick_interval: Duration::from_millis(3000),
            metadata_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_millis(600),
            max_edge: MAX_EDGE,
            jpeg_quality: JPEG_QUALITY,
            capture_configurations: CaptureConfiguration::default_priority_list(),
        }
    }
}
