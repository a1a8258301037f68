use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::events::{ProgressSink, ProgressStatus, ProgressUpdate};
use super::scan_loop::{LoopSettings, ScanLoopController};
use super::session::{ScanFailure, ScanOutcome, ScanReport, ScanSession, ScanState};
use crate::capture::backend::{CaptureBackend, VideoSource};
use crate::capture::negotiator::DeviceNegotiator;
use crate::capture::sampler::FrameSampler;
use crate::configuration::types::ScanSettings;
use crate::error_handling::types::SessionError;
use crate::fault_classification::FaultCategory;
use crate::identification::client::Identifier;

/// Owns the live video source of a session.
///
/// Tracks are stopped exactly once, either explicitly through
/// [`ActiveSource::release`] or when the guard is dropped (task abort,
/// runtime shutdown).
struct ActiveSource {
    session_id: Uuid,
    source: Box<dyn VideoSource>,
    released: bool,
}

impl ActiveSource {
    fn new(session_id: Uuid, source: Box<dyn VideoSource>) -> Self {
        Self {
            session_id,
            source,
            released: false,
        }
    }

    fn source(&mut self) -> &mut dyn VideoSource {
        self.source.as_mut()
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.stop_tracks();
            info!("[{}] Video source released", self.session_id);
        }
    }
}

impl Drop for ActiveSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Receiving end of a session's terminal report.
pub struct ScanOutcomeReceiver {
    rx: oneshot::Receiver<ScanReport>,
}

impl ScanOutcomeReceiver {
    /// Waits for the session's single terminal report.
    pub async fn wait(self) -> Result<ScanReport, SessionError> {
        self.rx.await.map_err(|_| SessionError::Aborted)
    }
}

/// Handed out by [`SessionLifecycleManager::activate`].
pub struct ScanSubscription {
    pub progress: mpsc::UnboundedReceiver<ProgressUpdate>,
    pub outcome: ScanOutcomeReceiver,
}

/// The structure related to the scanning session lifecycle.
///
/// It owns the video source and the scheduling of one scan session at a
/// time, and guarantees that whatever way a session ends (identification,
/// fatal fault, [`stop`](Self::stop), or the manager being dropped) the
/// camera is released and no further tick runs.
///
/// # Fields Overview
///
/// - `backend`: the platform camera subsystem
/// - `identifier`: the remote identification service
/// - `settings`: loop timing, frame sizing and capture priority list
/// - `cancel` / `task`: handles of the running session, if any
pub struct SessionLifecycleManager<B, I>
where
    B: CaptureBackend + 'static,
    I: Identifier + 'static,
{
    backend: Arc<B>,
    identifier: Arc<I>,
    settings: Arc<ScanSettings>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl<B, I> SessionLifecycleManager<B, I>
where
    B: CaptureBackend + 'static,
    I: Identifier + 'static,
{
    pub fn new(backend: Arc<B>, identifier: Arc<I>, settings: ScanSettings) -> Self {
        Self {
            backend,
            identifier,
            settings: Arc::new(settings),
            cancel: None,
            task: None,
        }
    }

    /// Starts a new session: negotiation, metadata wait, settle delay, then
    /// the scan loop.
    ///
    /// A session still running is stopped first; every activation
    /// negotiates a fresh video source.
    pub fn activate(&mut self) -> ScanSubscription {
        self.stop();

        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let task = tokio::spawn(run_session(
            Arc::clone(&self.backend),
            Arc::clone(&self.identifier),
            Arc::clone(&self.settings),
            cancel.clone(),
            ProgressSink::new(progress_tx),
            outcome_tx,
        ));

        self.cancel = Some(cancel);
        self.task = Some(task);

        ScanSubscription {
            progress: progress_rx,
            outcome: ScanOutcomeReceiver { rx: outcome_rx },
        }
    }

    /// Cancels the running session, if any. Idempotent.
    ///
    /// Pending ticks and in-flight identification calls are abandoned at
    /// their next poll; the session task then releases the camera and
    /// delivers a `Cancelled` report. The task handle is kept, so
    /// [`shutdown`](Self::shutdown) can still wait for that teardown and
    /// [`is_active`](Self::is_active) stays true until it is done.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if !cancel.is_cancelled() {
                info!("Stopping scan session");
            }
            cancel.cancel();
        }
    }

    /// Stops the running session and waits until it has torn down.
    pub async fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Scan session task ended abnormally: {}", e);
            }
        }
    }

    /// True while the session task, teardown included, is still running.
    pub fn is_active(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

impl<B, I> Drop for SessionLifecycleManager<B, I>
where
    B: CaptureBackend + 'static,
    I: Identifier + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_session<B, I>(
    backend: Arc<B>,
    identifier: Arc<I>,
    settings: Arc<ScanSettings>,
    cancel: CancellationToken,
    progress: ProgressSink,
    outcome_tx: oneshot::Sender<ScanReport>,
) where
    B: CaptureBackend + 'static,
    I: Identifier + 'static,
{
    let mut session = ScanSession::new();
    let session_id = session.id();
    info!("[{}] Scan session activated", session_id);

    let outcome = drive(
        &mut session,
        backend.as_ref(),
        identifier.as_ref(),
        &settings,
        &cancel,
        &progress,
    )
    .await;
    // nothing scheduled by this session may outlive it
    cancel.cancel();

    match &outcome {
        ScanOutcome::Identified(_) => info!("[{}] Scan session succeeded", session_id),
        ScanOutcome::Failed(failure) => {
            error!("[{}] Scan session failed: {}", session_id, failure.category)
        }
        ScanOutcome::Cancelled => info!("[{}] Scan session cancelled", session_id),
    }

    let report = session.finish(outcome);
    if outcome_tx.send(report).is_err() {
        debug!("[{}] Outcome receiver dropped", session_id);
    }
}

fn fail_early(
    session: &mut ScanSession,
    progress: &ProgressSink,
    category: FaultCategory,
) -> ScanOutcome {
    let failure = ScanFailure::new(category);
    session.transition(ScanState::Failed);
    progress.emit_failure(failure.guidance_key, None);
    ScanOutcome::Failed(failure)
}

async fn drive<B, I>(
    session: &mut ScanSession,
    backend: &B,
    identifier: &I,
    settings: &ScanSettings,
    cancel: &CancellationToken,
    progress: &ProgressSink,
) -> ScanOutcome
where
    B: CaptureBackend + 'static,
    I: Identifier + 'static,
{
    session.transition(ScanState::Negotiating);
    progress.emit(ProgressStatus::Negotiating, 0, None);

    let negotiator = DeviceNegotiator::new(backend);
    let negotiated = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ScanOutcome::Cancelled,
        negotiated = negotiator.negotiate(&settings.capture_configurations) => negotiated,
    };
    let negotiated = match negotiated {
        Ok(negotiated) => negotiated,
        Err(category) => return fail_early(session, progress, category),
    };
    session.set_configuration(negotiated.configuration);

    let mut active = ActiveSource::new(session.id(), negotiated.source);
    let outcome = run_with_source(session, &mut active, identifier, settings, cancel, progress).await;
    active.release();
    outcome
}

async fn run_with_source<I>(
    session: &mut ScanSession,
    active: &mut ActiveSource,
    identifier: &I,
    settings: &ScanSettings,
    cancel: &CancellationToken,
    progress: &ProgressSink,
) -> ScanOutcome
where
    I: Identifier + 'static,
{
    session.transition(ScanState::AwaitingMetadata);
    let metadata = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ScanOutcome::Cancelled,
        ready = tokio::time::timeout(settings.metadata_timeout, active.source().wait_for_metadata()) => ready,
    };
    if metadata.is_err() {
        warn!(
            "[{}] Video source reported no metadata within {:?}",
            session.id(),
            settings.metadata_timeout
        );
        return fail_early(session, progress, FaultCategory::StreamTimeout);
    }

    session.transition(ScanState::Settling);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return ScanOutcome::Cancelled,
        _ = tokio::time::sleep(settings.settle_delay) => {}
    }

    let sampler = FrameSampler::new(settings.max_edge, settings.jpeg_quality);
    let controller = ScanLoopController::new(
        identifier,
        &sampler,
        LoopSettings {
            max_attempts: settings.max_attempts,
            tick_interval: settings.tick_interval,
        },
        &settings.locale,
        progress,
    );
    controller.run(session, active.source(), cancel).await
}
