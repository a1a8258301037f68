//! Frame sampling: snapshot, downsize, JPEG-encode.

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::DynamicImage;
use log::{debug, trace};

use super::backend::VideoSource;
use super::types::Frame;
use crate::error_handling::types::CaptureError;

/// Longest edge, in pixels, of a submitted frame.
pub const MAX_EDGE: u32 = 1024;
/// Compression quality on a 0..=1 scale. Frames are disposable.
pub const JPEG_QUALITY: f32 = 0.8;

/// Scales `(width, height)` uniformly so the longer edge fits in
/// `max_edge`. Never upscales.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }
    let scale = max_edge as f64 / longest as f64;
    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max_edge);
    (scaled(width), scaled(height))
}

#[derive(Debug, Clone)]
pub struct FrameSampler {
    max_edge: u32,
    quality: f32,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(MAX_EDGE, JPEG_QUALITY)
    }
}

impl FrameSampler {
    pub fn new(max_edge: u32, quality: f32) -> Self {
        Self {
            max_edge: max_edge.max(1),
            quality: quality.clamp(0.01, 1.0),
        }
    }

    fn encoder_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Grabs one frame from `source`.
    ///
    /// Returns `Ok(None)` while the source is not producing decodable frames;
    /// that is expected right after negotiation and not an error. The
    /// snapshot is taken on the calling task; downsizing and encoding run on
    /// the blocking pool.
    pub async fn sample(
        &self,
        source: &mut dyn VideoSource,
    ) -> Result<Option<Frame>, CaptureError> {
        if !source.is_ready() {
            trace!("Video source not ready, skipping sample");
            return Ok(None);
        }
        let Some(snapshot) = source.snapshot().await else {
            trace!("Video source produced no decodable frame");
            return Ok(None);
        };

        let sampler = self.clone();
        let frame = tokio::task::spawn_blocking(move || sampler.encode(snapshot))
            .await
            .map_err(|e| CaptureError::EncodeFailed(e.to_string()))??;
        Ok(Some(frame))
    }

    /// Downsizes and JPEG-encodes one snapshot. CPU bound.
    pub fn encode(&self, snapshot: DynamicImage) -> Result<Frame, CaptureError> {
        let (width, height) = (snapshot.width(), snapshot.height());
        if width == 0 || height == 0 {
            return Err(CaptureError::SnapshotFailed(format!(
                "empty snapshot {}x{}",
                width, height
            )));
        }

        let (target_width, target_height) = fit_within(width, height, self.max_edge);
        let rgb = snapshot.into_rgb8();
        let rgb = if (target_width, target_height) == (width, height) {
            rgb
        } else {
            imageops::resize(&rgb, target_width, target_height, FilterType::Triangle)
        };

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.encoder_quality())
            .encode_image(&rgb)
            .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;

        debug!(
            "Sampled frame {}x{} -> {}x{}, {} bytes",
            width,
            height,
            target_width,
            target_height,
            bytes.len()
        );

        Ok(Frame {
            width: target_width,
            height: target_height,
            bytes,
            quality: self.quality,
            captured_at: Utc::now(),
        })
    }
}
