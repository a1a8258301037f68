//! Directory-backed capture backend.
//!
//! Serves the JPEG/PNG files of a directory, in name order and looping, as
//! if they were frames of a camera. Used by the command line tool to run the
//! scanning engine without camera hardware.

use async_trait::async_trait;
use image::DynamicImage;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use super::backend::{CaptureBackend, VideoSource};
use super::types::CaptureConfiguration;
use crate::error_handling::types::RawDeviceError;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub struct ImageDirectoryBackend {
    directory: PathBuf,
}

impl ImageDirectoryBackend {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    async fn list_images(&self) -> Result<Vec<PathBuf>, RawDeviceError> {
        let mut entries = tokio::fs::read_dir(&self.directory)
            .await
            .map_err(|e| RawDeviceError::from_io(&e))?;
        let mut images = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RawDeviceError::from_io(&e))?
        {
            let path = entry.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }
}

#[async_trait]
impl CaptureBackend for ImageDirectoryBackend {
    fn is_secure_context(&self) -> bool {
        // local files are always a trusted context
        true
    }

    async fn open(
        &self,
        config: &CaptureConfiguration,
    ) -> Result<Box<dyn VideoSource>, RawDeviceError> {
        if let (true, Some(facing)) = (config.exact, config.facing) {
            return Err(RawDeviceError::new(
                "OverconstrainedError",
                format!("an image directory has no {} facing camera", facing),
            ));
        }

        let frames = self.list_images().await?;
        if frames.is_empty() {
            return Err(RawDeviceError::new(
                "NotFoundError",
                format!("no images in {}", self.directory.display()),
            ));
        }

        info!(
            "Opened image directory {} with {} frame(s) for {}",
            self.directory.display(),
            frames.len(),
            config.label
        );
        Ok(Box::new(StillImageSource::new(frames)))
    }
}

pub struct StillImageSource {
    frames: Vec<PathBuf>,
    cursor: usize,
    dimensions: Option<(u32, u32)>,
    stopped: bool,
}

impl StillImageSource {
    fn new(frames: Vec<PathBuf>) -> Self {
        Self {
            frames,
            cursor: 0,
            dimensions: None,
            stopped: false,
        }
    }
}

#[async_trait]
impl VideoSource for StillImageSource {
    async fn wait_for_metadata(&mut self) {
        let frames = self.frames.clone();
        let probe = tokio::task::spawn_blocking(move || {
            frames
                .iter()
                .find_map(|path| image::image_dimensions(path).ok())
        })
        .await
        .unwrap_or_else(|e| {
            warn!("Image metadata probe failed: {}", e);
            None
        });
        match probe {
            Some(dimensions) => {
                debug!("Image source metadata: {}x{}", dimensions.0, dimensions.1);
                self.dimensions = Some(dimensions);
            }
            // Nothing decodable: stay unready and let the caller's timeout fire.
            None => std::future::pending::<()>().await,
        }
    }

    fn is_ready(&self) -> bool {
        !self.stopped && self.dimensions.is_some()
    }

    async fn snapshot(&mut self) -> Option<DynamicImage> {
        if self.stopped || self.frames.is_empty() {
            return None;
        }
        let path = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor += 1;
        let decode_path = path.clone();
        match tokio::task::spawn_blocking(move || image::open(decode_path)).await {
            Ok(Ok(image)) => Some(image),
            Ok(Err(e)) => {
                warn!("Could not decode {}: {}", path.display(), e);
                None
            }
            Err(e) => {
                warn!("Decode task for {} failed: {}", path.display(), e);
                None
            }
        }
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            debug!("Image source stopped after {} snapshot(s)", self.cursor);
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }
}
