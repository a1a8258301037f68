//! Fault classification.
//!
//! Every failure the engine can meet is folded into a [`FaultCategory`]. The
//! category alone decides whether the session ends ([`RetryPolicy::Fatal`])
//! or whether the attempt budget absorbs it ([`RetryPolicy::Retry`]).
//!
//! - [`classifier`]: maps raw device, capture and identification errors to
//!   categories.
//! - [`types`]: the category enum and its retry policy.

pub mod classifier;
pub mod types;

pub use classifier::{classify, classify_capture, classify_identify};
pub use types::{FaultCategory, RetryPolicy};
