use log::error;
use regex::Regex;
use std::sync::OnceLock;

use super::types::FaultCategory;
use crate::error_handling::types::{CaptureError, IdentifyError, RawDeviceError};

/// Signatures matched against [`RawDeviceError::name`].
const NAME_RULES: &[(&str, FaultCategory)] = &[
    (
        r"(?i)^(NotAllowedError|PermissionDeniedError|SecurityError)$",
        FaultCategory::PermissionDenied,
    ),
    (
        r"(?i)^(NotFoundError|DevicesNotFoundError)$",
        FaultCategory::DeviceNotFound,
    ),
    (
        r"(?i)^(NotReadableError|TrackStartError|AbortError)$",
        FaultCategory::DeviceBusy,
    ),
    (
        r"(?i)^(OverconstrainedError|ConstraintNotSatisfiedError|TypeError)$",
        FaultCategory::Unsupported,
    ),
];

/// Signatures matched against [`RawDeviceError::message`] when the name is
/// not recognised (OS level errors surfaced through generic names).
const MESSAGE_RULES: &[(&str, FaultCategory)] = &[
    (
        r"(?i)permission denied|\bEACCES\b|\bEPERM\b",
        FaultCategory::PermissionDenied,
    ),
    (
        r"(?i)no such (file or directory|device)|\bENOENT\b|\bENODEV\b",
        FaultCategory::DeviceNotFound,
    ),
    (
        r"(?i)device or resource busy|\bEBUSY\b|already in use",
        FaultCategory::DeviceBusy,
    ),
];

struct Rules {
    by_name: Vec<(Regex, FaultCategory)>,
    by_message: Vec<(Regex, FaultCategory)>,
}

fn compile(table: &[(&str, FaultCategory)]) -> Vec<(Regex, FaultCategory)> {
    table
        .iter()
        .filter_map(|(pattern, category)| match Regex::new(pattern) {
            Ok(regex) => Some((regex, *category)),
            Err(e) => {
                error!("Invalid fault signature {}: {}", pattern, e);
                None
            }
        })
        .collect()
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        by_name: compile(NAME_RULES),
        by_message: compile(MESSAGE_RULES),
    })
}

/// Maps a device negotiation failure to its category.
///
/// Names are checked before messages; anything unrecognised is reported as
/// [`FaultCategory::Unsupported`].
pub fn classify(err: &RawDeviceError) -> FaultCategory {
    let rules = rules();
    rules
        .by_name
        .iter()
        .find(|(regex, _)| regex.is_match(&err.name))
        .or_else(|| {
            rules
                .by_message
                .iter()
                .find(|(regex, _)| regex.is_match(&err.message))
        })
        .map(|(_, category)| *category)
        .unwrap_or(FaultCategory::Unsupported)
}

/// A rate limit is the only fatal identification fault.
pub fn classify_identify(err: &IdentifyError) -> FaultCategory {
    match err {
        IdentifyError::RateLimited { .. } => FaultCategory::QuotaExceeded,
        _ => FaultCategory::TransientNetwork,
    }
}

pub fn classify_capture(_err: &CaptureError) -> FaultCategory {
    FaultCategory::TransientCapture
}
