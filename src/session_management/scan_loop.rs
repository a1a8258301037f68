//! Scan loop controller.
//!
//! Runs timed analysis attempts against a live [`VideoSource`] until one of
//! them is conclusive, a fatal fault occurs, the attempt budget runs out, or
//! the session is cancelled.
//!
//! Ticks are sequential: the next tick is scheduled only once the current
//! one has resolved, so two identification calls are never in flight at the
//! same time. Every suspension point also waits on the cancellation token.

use log::{debug, error, info, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::events::{ProgressSink, ProgressStatus};
use super::session::{AttemptOutcome, ScanFailure, ScanOutcome, ScanSession, ScanState};
use crate::capture::backend::VideoSource;
use crate::capture::sampler::FrameSampler;
use crate::fault_classification::{classify_capture, classify_identify, FaultCategory};
use crate::identification::client::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub max_attempts: u32,
    pub tick_interval: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            tick_interval: Duration::from_millis(3000),
        }
    }
}

pub struct ScanLoopController<'a> {
    identifier: &'a dyn Identifier,
    sampler: &'a FrameSampler,
    settings: LoopSettings,
    locale: &'a str,
    progress: &'a ProgressSink,
}

impl<'a> ScanLoopController<'a> {
    pub fn new(
        identifier: &'a dyn Identifier,
        sampler: &'a FrameSampler,
        settings: LoopSettings,
        locale: &'a str,
        progress: &'a ProgressSink,
    ) -> Self {
        Self {
            identifier,
            sampler,
            settings,
            locale,
            progress,
        }
    }

    fn fail(&self, session: &mut ScanSession, category: FaultCategory) -> ScanOutcome {
        let failure = ScanFailure::new(category);
        session.transition(ScanState::Failed);
        self.progress
            .emit_failure(failure.guidance_key, Some(session.attempt_count()));
        ScanOutcome::Failed(failure)
    }

    /// Drives the loop to a terminal outcome.
    ///
    /// The first tick starts immediately; later ticks start one
    /// `tick_interval` after the previous one resolved. A tick whose sampler
    /// yields nothing still consumes an attempt.
    pub async fn run(
        &self,
        session: &mut ScanSession,
        source: &mut dyn VideoSource,
        cancel: &CancellationToken,
    ) -> ScanOutcome {
        let session_id = session.id();
        let mut confidence_percent = 0u8;

        loop {
            let completed = session.attempt_count();
            if completed >= self.settings.max_attempts {
                info!(
                    "[{}] No conclusive identification after {} attempts",
                    session_id, completed
                );
                return self.fail(session, FaultCategory::MaxAttemptsReached);
            }

            if completed > 0 {
                session.transition(ScanState::Retrying { attempt: completed });
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return ScanOutcome::Cancelled,
                    _ = tokio::time::sleep(self.settings.tick_interval) => {}
                }
            }
            if cancel.is_cancelled() {
                return ScanOutcome::Cancelled;
            }

            let attempt = session.begin_attempt();
            session.transition(ScanState::Sampling { attempt });
            self.progress
                .emit(ProgressStatus::Analyzing, confidence_percent, Some(attempt));

            let sampled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return ScanOutcome::Cancelled,
                sampled = self.sampler.sample(&mut *source) => sampled,
            };
            let frame = match sampled {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!(
                        "[{}] Attempt {}: no frame available, skipping analysis",
                        session_id, attempt
                    );
                    session.record(attempt, AttemptOutcome::NoFrame);
                    continue;
                }
                Err(e) => {
                    let category = classify_capture(&e);
                    warn!("[{}] Attempt {}: {}", session_id, attempt, e);
                    session.record(
                        attempt,
                        AttemptOutcome::SoftFault {
                            category,
                            detail: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            session.transition(ScanState::Analyzing { attempt });
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return ScanOutcome::Cancelled,
                result = self.identifier.identify(frame, self.locale) => result,
            };

            match result {
                Ok(identification) => {
                    let tier = identification.confidence;
                    session.record(attempt, AttemptOutcome::Identified(tier));
                    confidence_percent = tier.progress_percent();
                    if tier.is_conclusive() {
                        info!(
                            "[{}] Identified {:?} with {} confidence on attempt {}",
                            session_id, identification.medication_name, tier, attempt
                        );
                        session.transition(ScanState::Succeeded);
                        self.progress.emit(
                            ProgressStatus::Succeeded,
                            confidence_percent,
                            Some(attempt),
                        );
                        return ScanOutcome::Identified(identification);
                    }
                    debug!(
                        "[{}] Attempt {}: {} confidence, continuing",
                        session_id, attempt, tier
                    );
                    self.progress
                        .emit(ProgressStatus::Focused, confidence_percent, Some(attempt));
                }
                Err(e) => {
                    let category = classify_identify(&e);
                    if category.is_fatal() {
                        error!(
                            "[{}] Attempt {}: fatal identification fault: {}",
                            session_id, attempt, e
                        );
                        session.record(attempt, AttemptOutcome::Fatal(category));
                        return self.fail(session, category);
                    }
                    warn!("[{}] Attempt {}: {}", session_id, attempt, e);
                    session.record(
                        attempt,
                        AttemptOutcome::SoftFault {
                            category,
                            detail: e.to_string(),
                        },
                    );
                }
            }
        }
    }
}
