pub mod capture;
pub use capture::{CaptureBackend, CaptureConfiguration, Frame, ImageDirectoryBackend, VideoSource};

pub mod configuration;
pub use configuration::{Config, ScanSettings, ServiceSettings};

pub mod error_handling;

pub mod fault_classification;
pub use fault_classification::FaultCategory;

pub mod guidance;

pub mod identification;
pub use identification::{ConfidenceTier, HttpIdentificationClient, Identification, Identifier};

pub mod session_management;
pub use session_management::{
    ProgressUpdate, ScanOutcome, ScanReport, ScanSubscription, SessionLifecycleManager,
};
