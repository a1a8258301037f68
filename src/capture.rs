//! Camera capture subsystem.
//!
//! - [`backend`]: the `CaptureBackend` / `VideoSource` seams towards the
//!   platform camera.
//! - [`negotiator`]: ordered fallback over capture configurations.
//! - [`sampler`]: snapshot, downsize and encode one frame.
//! - [`still_image`]: an image directory posing as a camera.
//! - [`types`]: capture configurations and frames.

pub mod backend;
#[cfg(test)]
pub(crate) mod fakes;
pub mod negotiator;
pub mod sampler;
pub mod still_image;
pub mod types;

pub use backend::{CaptureBackend, VideoSource};
pub use negotiator::{DeviceNegotiator, Negotiated};
pub use sampler::FrameSampler;
pub use still_image::ImageDirectoryBackend;
pub use types::{CaptureConfiguration, FacingMode, Frame, Resolution};
