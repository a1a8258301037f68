use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
    BadEndpoint(String),
    CapturesEmpty,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
            ConfigError::BadEndpoint(e) => write!(f, "Endpoint error: {}", e),
            ConfigError::CapturesEmpty => {
                write!(f, "Capture configuration list must not be empty")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlError(err.to_string())
    }
}

/// Failure reported by a capture backend when it cannot open a configuration.
///
/// `name` carries the platform's error identifier (for example
/// `NotAllowedError` or `IoError`), `message` its human readable detail.
/// Both are matched by the fault classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeviceError {
    pub name: String,
    pub message: String,
}

impl RawDeviceError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Platform-style name for filesystem failures: missing paths read as
    /// `NotFoundError`, refused access as `NotAllowedError`.
    pub fn from_io(err: &std::io::Error) -> Self {
        let name = match err.kind() {
            std::io::ErrorKind::NotFound => "NotFoundError",
            std::io::ErrorKind::PermissionDenied => "NotAllowedError",
            _ => "IoError",
        };
        Self::new(name, err.to_string())
    }
}

impl fmt::Display for RawDeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for RawDeviceError {}

#[derive(Debug)]
pub enum CaptureError {
    SnapshotFailed(String),
    EncodeFailed(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SnapshotFailed(e) => write!(f, "Snapshot failed: {}", e),
            CaptureError::EncodeFailed(e) => write!(f, "Frame encoding failed: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

#[derive(Debug)]
pub enum IdentifyError {
    RateLimited { retry_after_secs: Option<u64> },
    Http { status: u16, body: String },
    Transport(String),
    Malformed(String),
    ClientBuild(String),
}

impl fmt::Display for IdentifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifyError::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "Identification rate limit exceeded, retry after {}s", secs),
            IdentifyError::RateLimited {
                retry_after_secs: None,
            } => write!(f, "Identification rate limit exceeded"),
            IdentifyError::Http { status, body } => {
                write!(f, "Identification service returned {}: {}", status, body)
            }
            IdentifyError::Transport(e) => write!(f, "Identification transport error: {}", e),
            IdentifyError::Malformed(e) => write!(f, "Malformed identification response: {}", e),
            IdentifyError::ClientBuild(e) => write!(f, "HTTP client setup failed: {}", e),
        }
    }
}

impl std::error::Error for IdentifyError {}

#[derive(Debug)]
pub enum SessionError {
    /// The session task ended without delivering a report.
    Aborted,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Aborted => write!(f, "Scan session aborted before completion"),
        }
    }
}

impl std::error::Error for SessionError {}
