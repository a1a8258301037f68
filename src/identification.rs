//! Remote medication identification.

pub mod client;
pub mod types;

pub use client::{HttpIdentificationClient, Identifier};
pub use types::{ConfidenceTier, Identification};
