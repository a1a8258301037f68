//! Session management core module.
//!
//! A scan session runs from activation to exactly one terminal outcome:
//! negotiate a camera, wait for its metadata, let it settle, then run timed
//! analysis attempts until a conclusive identification, a fatal fault, the
//! attempt budget running out, or a stop request.
//!
//! Re-exports:
//! - [`SessionLifecycleManager`]: activation, stop and teardown.
//! - [`ScanLoopController`]: the timed sample-then-identify loop.
//! - [`ScanSession`], [`ScanReport`], [`ScanOutcome`]: the session record.
//! - [`ProgressUpdate`]: what the UI is told while a session runs.

pub mod events;
pub mod scan_loop;
pub mod session;
pub mod session_manager;

pub use events::{ProgressSink, ProgressStatus, ProgressUpdate};
pub use scan_loop::{LoopSettings, ScanLoopController};
pub use session::{
    AnalysisAttempt, AttemptOutcome, ScanFailure, ScanOutcome, ScanReport, ScanSession, ScanState,
};
pub use session_manager::{ScanOutcomeReceiver, ScanSubscription, SessionLifecycleManager};
