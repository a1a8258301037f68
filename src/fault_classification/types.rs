use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultCategory {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    Unsupported,
    InsecureContext,
    TransientCapture,
    TransientNetwork,
    QuotaExceeded,
    MaxAttemptsReached,
    /// The negotiated stream never reported playable metadata in time.
    StreamTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Fatal,
    Retry,
}

impl FaultCategory {
    pub const ALL: [FaultCategory; 10] = [
        FaultCategory::PermissionDenied,
        FaultCategory::DeviceNotFound,
        FaultCategory::DeviceBusy,
        FaultCategory::Unsupported,
        FaultCategory::InsecureContext,
        FaultCategory::TransientCapture,
        FaultCategory::TransientNetwork,
        FaultCategory::QuotaExceeded,
        FaultCategory::MaxAttemptsReached,
        FaultCategory::StreamTimeout,
    ];

    pub fn retry_policy(self) -> RetryPolicy {
        match self {
            FaultCategory::TransientCapture | FaultCategory::TransientNetwork => {
                RetryPolicy::Retry
            }
            _ => RetryPolicy::Fatal,
        }
    }

    pub fn is_fatal(self) -> bool {
        self.retry_policy() == RetryPolicy::Fatal
    }

    /// Rank used when every capture configuration failed and one category
    /// has to be reported. Higher wins.
    pub(crate) fn specificity(self) -> u8 {
        match self {
            FaultCategory::PermissionDenied => 4,
            FaultCategory::DeviceBusy => 3,
            FaultCategory::DeviceNotFound => 2,
            FaultCategory::Unsupported => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FaultCategory::PermissionDenied => "permission denied",
            FaultCategory::DeviceNotFound => "device not found",
            FaultCategory::DeviceBusy => "device busy",
            FaultCategory::Unsupported => "unsupported",
            FaultCategory::InsecureContext => "insecure context",
            FaultCategory::TransientCapture => "transient capture fault",
            FaultCategory::TransientNetwork => "transient network fault",
            FaultCategory::QuotaExceeded => "quota exceeded",
            FaultCategory::MaxAttemptsReached => "max attempts reached",
            FaultCategory::StreamTimeout => "stream timeout",
        };
        write!(f, "{}", label)
    }
}
