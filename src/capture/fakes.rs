//! Scripted capture backend used by unit tests.

use async_trait::async_trait;
use image::DynamicImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::backend::{CaptureBackend, VideoSource};
use super::types::CaptureConfiguration;
use crate::error_handling::types::RawDeviceError;

/// Observable state of one opened fake stream.
pub(crate) struct SourceProbe {
    stopped: AtomicBool,
    stop_calls: AtomicUsize,
    snapshots: AtomicUsize,
    ready_script: Mutex<VecDeque<bool>>,
    hang_metadata: bool,
    width: u32,
    height: u32,
}

impl SourceProbe {
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshots(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakeSource {
    probe: Arc<SourceProbe>,
}

#[async_trait]
impl VideoSource for FakeSource {
    async fn wait_for_metadata(&mut self) {
        if self.probe.hang_metadata {
            std::future::pending::<()>().await;
        }
    }

    fn is_ready(&self) -> bool {
        if self.probe.is_stopped() {
            return false;
        }
        self.probe
            .ready_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(true)
    }

    async fn snapshot(&mut self) -> Option<DynamicImage> {
        self.probe.snapshots.fetch_add(1, Ordering::SeqCst);
        Some(DynamicImage::new_rgb8(self.probe.width, self.probe.height))
    }

    fn stop_tracks(&mut self) {
        self.probe.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.stopped.store(true, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        !self.probe.is_stopped()
    }
}

pub(crate) struct FakeBackend {
    secure: bool,
    open_results: Mutex<VecDeque<Result<(), RawDeviceError>>>,
    attempted: Mutex<Vec<String>>,
    opened: Mutex<Vec<Arc<SourceProbe>>>,
    ready_script: Vec<bool>,
    hang_metadata: bool,
    frame_size: (u32, u32),
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            secure: true,
            open_results: Mutex::new(VecDeque::new()),
            attempted: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            ready_script: Vec::new(),
            hang_metadata: false,
            frame_size: (320, 240),
        }
    }

    pub(crate) fn insecure(mut self) -> Self {
        self.secure = false;
        self
    }

    /// Results returned by successive `open` calls; once exhausted every
    /// call succeeds.
    pub(crate) fn with_open_results(self, results: Vec<Result<(), RawDeviceError>>) -> Self {
        *self.open_results.lock().unwrap() = results.into();
        self
    }

    /// Successive answers of `is_ready`; once exhausted the stream is ready.
    pub(crate) fn with_ready_script(mut self, script: Vec<bool>) -> Self {
        self.ready_script = script;
        self
    }

    pub(crate) fn with_hanging_metadata(mut self) -> Self {
        self.hang_metadata = true;
        self
    }

    pub(crate) fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    pub(crate) fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    pub(crate) fn opened(&self) -> Vec<Arc<SourceProbe>> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptureBackend for FakeBackend {
    fn is_secure_context(&self) -> bool {
        self.secure
    }

    async fn open(
        &self,
        config: &CaptureConfiguration,
    ) -> Result<Box<dyn VideoSource>, RawDeviceError> {
        self.attempted.lock().unwrap().push(config.label.clone());
        if let Some(Err(e)) = self.open_results.lock().unwrap().pop_front() {
            return Err(e);
        }
        let probe = Arc::new(SourceProbe {
            stopped: AtomicBool::new(false),
            stop_calls: AtomicUsize::new(0),
            snapshots: AtomicUsize::new(0),
            ready_script: Mutex::new(self.ready_script.clone().into()),
            hang_metadata: self.hang_metadata,
            width: self.frame_size.0,
            height: self.frame_size.1,
        });
        self.opened.lock().unwrap().push(Arc::clone(&probe));
        Ok(Box::new(FakeSource { probe }))
    }
}
