//! Common data types used across the capture subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointed away from the user.
    Environment,
    /// Front camera.
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One acceptable way of opening a camera.
///
/// Configurations are tried in list order; the list is fixed when the engine
/// is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureConfiguration {
    /// Short name used in logs (e.g. `env-exact`).
    pub label: String,
    /// Preferred facing; `None` accepts any device.
    pub facing: Option<FacingMode>,
    pub ideal: Resolution,
    pub max: Option<Resolution>,
    /// When set the facing preference is a hard constraint.
    pub exact: bool,
}

impl CaptureConfiguration {
    /// Rear camera first, relaxing constraints step by step down to any device.
    pub fn default_priority_list() -> Vec<CaptureConfiguration> {
        vec![
            CaptureConfiguration {
                label: "env-exact".to_string(),
                facing: Some(FacingMode::Environment),
                ideal: Resolution::new(1920, 1080),
                max: Some(Resolution::new(3840, 2160)),
                exact: true,
            },
            CaptureConfiguration {
                label: "env-relaxed".to_string(),
                facing: Some(FacingMode::Environment),
                ideal: Resolution::new(1280, 720),
                max: Some(Resolution::new(1920, 1080)),
                exact: false,
            },
            CaptureConfiguration {
                label: "user".to_string(),
                facing: Some(FacingMode::User),
                ideal: Resolution::new(1280, 720),
                max: None,
                exact: false,
            },
            CaptureConfiguration {
                label: "any".to_string(),
                facing: None,
                ideal: Resolution::new(640, 480),
                max: None,
                exact: false,
            },
        ]
    }
}

/// A single encoded snapshot, consumed by one identification call.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// JPEG payload.
    pub bytes: Vec<u8>,
    /// Compression quality on a 0..=1 scale.
    pub quality: f32,
    pub captured_at: DateTime<Utc>,
}
