use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use uuid::Uuid;

use crate::capture::types::CaptureConfiguration;
use crate::fault_classification::FaultCategory;
use crate::guidance;
use crate::identification::types::{ConfidenceTier, Identification};

/// Where a scan session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanState {
    Idle,
    Negotiating,
    AwaitingMetadata,
    Settling,
    Sampling { attempt: u32 },
    Analyzing { attempt: u32 },
    Retrying { attempt: u32 },
    Succeeded,
    Failed,
    Cancelled,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanState::Succeeded | ScanState::Failed | ScanState::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttemptOutcome {
    /// Tick started, result not known yet.
    Pending,
    /// The source had no decodable frame; no network call was made.
    NoFrame,
    Identified(ConfidenceTier),
    SoftFault { category: FaultCategory, detail: String },
    Fatal(FaultCategory),
    /// Stopped while the attempt was in flight.
    Interrupted,
}

/// One sample-then-identify tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisAttempt {
    /// 1-based, contiguous within a session.
    pub sequence: u32,
    pub started_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFailure {
    pub category: FaultCategory,
    pub guidance_key: &'static str,
}

impl ScanFailure {
    pub fn new(category: FaultCategory) -> Self {
        Self {
            category,
            guidance_key: guidance::fault_message_key(category),
        }
    }
}

/// Terminal result of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScanOutcome {
    Identified(Identification),
    Failed(ScanFailure),
    Cancelled,
}

/// Everything a finished session hands back to its caller, exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub configuration: Option<CaptureConfiguration>,
    pub attempts: Vec<AnalysisAttempt>,
    pub outcome: ScanOutcome,
}

/// Mutable record of one activation-to-outcome run.
pub struct ScanSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    state: ScanState,
    configuration: Option<CaptureConfiguration>,
    attempts: Vec<AnalysisAttempt>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: ScanState::Idle,
            configuration: None,
            attempts: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn transition(&mut self, next: ScanState) {
        debug!("[{}] {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    pub fn set_configuration(&mut self, configuration: CaptureConfiguration) {
        self.configuration = Some(configuration);
    }

    pub fn configuration(&self) -> Option<&CaptureConfiguration> {
        self.configuration.as_ref()
    }

    /// Opens the next attempt and returns its sequence number.
    pub fn begin_attempt(&mut self) -> u32 {
        let sequence = self.attempts.len() as u32 + 1;
        self.attempts.push(AnalysisAttempt {
            sequence,
            started_at: Utc::now(),
            outcome: AttemptOutcome::Pending,
        });
        sequence
    }

    pub fn record(&mut self, sequence: u32, outcome: AttemptOutcome) {
        if let Some(attempt) = self
            .attempts
            .iter_mut()
            .rev()
            .find(|a| a.sequence == sequence)
        {
            attempt.outcome = outcome;
        }
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }

    pub fn attempts(&self) -> &[AnalysisAttempt] {
        &self.attempts
    }

    /// Closes the session. Consumes it, so a session reaches its terminal
    /// state once.
    pub fn finish(mut self, outcome: ScanOutcome) -> ScanReport {
        let terminal = match outcome {
            ScanOutcome::Identified(_) => ScanState::Succeeded,
            ScanOutcome::Failed(_) => ScanState::Failed,
            ScanOutcome::Cancelled => ScanState::Cancelled,
        };
        if self.state != terminal {
            self.transition(terminal);
        }
        for attempt in self.attempts.iter_mut() {
            if attempt.outcome == AttemptOutcome::Pending {
                attempt.outcome = AttemptOutcome::Interrupted;
            }
        }
        ScanReport {
            session_id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            configuration: self.configuration,
            attempts: self.attempts,
            outcome,
        }
    }
}
