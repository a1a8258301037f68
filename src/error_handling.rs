//! Error types shared across the scanning engine.

pub mod types;

pub use types::{CaptureError, ConfigError, IdentifyError, RawDeviceError, SessionError};
