//! Seams towards the platform camera subsystem.
//!
//! The engine never touches a device directly: a [`CaptureBackend`] opens
//! streams for a given [`CaptureConfiguration`] and hands back a
//! [`VideoSource`] that the session lifecycle owns until teardown.

use async_trait::async_trait;
use image::DynamicImage;

use super::types::CaptureConfiguration;
use crate::error_handling::types::RawDeviceError;

#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Whether the runtime may access capture devices at all (trusted origin
    /// or local context). Checked before any device is touched.
    fn is_secure_context(&self) -> bool;

    /// Opens a live stream satisfying `config`.
    ///
    /// The returned source is already capturing and must be released with
    /// [`VideoSource::stop_tracks`].
    async fn open(
        &self,
        config: &CaptureConfiguration,
    ) -> Result<Box<dyn VideoSource>, RawDeviceError>;
}

/// A live capture stream.
#[async_trait]
pub trait VideoSource: Send {
    /// Resolves once the stream has reported its first playable metadata.
    /// May never resolve; callers bound it with a timeout.
    async fn wait_for_metadata(&mut self);

    /// Whether the stream is currently producing decodable frames.
    fn is_ready(&self) -> bool;

    /// Grabs the current frame, `None` if nothing decodable is available.
    /// Implementations that decode or read files do so off the async
    /// workers.
    async fn snapshot(&mut self) -> Option<DynamicImage>;

    /// Stops every track of the stream. Must be idempotent.
    fn stop_tracks(&mut self);

    fn is_live(&self) -> bool;
}
