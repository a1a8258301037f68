//! Device negotiation.
//!
//! Walks a priority-ordered list of [`CaptureConfiguration`]s and returns the
//! first stream the backend agrees to open. A permission rejection ends the
//! walk immediately: the user said no, and a different resolution will not
//! change that.

use log::{debug, error, info, warn};

use super::backend::{CaptureBackend, VideoSource};
use super::types::CaptureConfiguration;
use crate::fault_classification::{classify, FaultCategory};

/// Outcome of a successful negotiation.
pub struct Negotiated {
    /// Live stream; the caller is responsible for releasing it.
    pub source: Box<dyn VideoSource>,
    pub configuration: CaptureConfiguration,
    /// Number of configurations that failed before this one succeeded.
    pub fallbacks_used: usize,
}

pub struct DeviceNegotiator<'a, B: CaptureBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: CaptureBackend + ?Sized> DeviceNegotiator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Fails fast with [`FaultCategory::InsecureContext`] when the runtime
    /// may not access capture devices.
    pub fn ensure_secure_context(&self) -> Result<(), FaultCategory> {
        if self.backend.is_secure_context() {
            Ok(())
        } else {
            error!("Capture devices are not accessible from an insecure context");
            Err(FaultCategory::InsecureContext)
        }
    }

    /// Tries each configuration in order and stops at the first success.
    ///
    /// When every configuration fails without a permission rejection the
    /// most specific category observed is returned.
    pub async fn negotiate(
        &self,
        configs: &[CaptureConfiguration],
    ) -> Result<Negotiated, FaultCategory> {
        self.ensure_secure_context()?;

        let mut most_specific: Option<FaultCategory> = None;
        for (index, config) in configs.iter().enumerate() {
            debug!(
                "Opening capture configuration {} ({}/{})",
                config.label,
                index + 1,
                configs.len()
            );
            match self.backend.open(config).await {
                Ok(source) => {
                    info!(
                        "Negotiated capture configuration {} after {} fallback(s)",
                        config.label, index
                    );
                    return Ok(Negotiated {
                        source,
                        configuration: config.clone(),
                        fallbacks_used: index,
                    });
                }
                Err(raw) => {
                    let category = classify(&raw);
                    if category == FaultCategory::PermissionDenied {
                        warn!(
                            "Camera permission rejected on {}: {}, not trying remaining configurations",
                            config.label, raw
                        );
                        return Err(category);
                    }
                    debug!(
                        "Configuration {} failed ({}): {}",
                        config.label, category, raw
                    );
                    most_specific = match most_specific {
                        Some(previous) if previous.specificity() >= category.specificity() => {
                            Some(previous)
                        }
                        _ => Some(category),
                    };
                }
            }
        }

        let category = most_specific.unwrap_or(FaultCategory::Unsupported);
        error!(
            "All {} capture configurations failed, reporting {}",
            configs.len(),
            category
        );
        Err(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fakes::FakeBackend;
    use crate::error_handling::types::RawDeviceError;

    fn labels() -> Vec<String> {
        CaptureConfiguration::default_priority_list()
            .into_iter()
            .map(|c| c.label)
            .collect()
    }

    #[tokio::test]
    async fn first_configuration_wins_without_fallback() {
        let backend = FakeBackend::new();
        let negotiated = DeviceNegotiator::new(&backend)
            .negotiate(&CaptureConfiguration::default_priority_list())
            .await
            .unwrap_or_else(|c| panic!("negotiation failed: {}", c));

        assert_eq!(negotiated.fallbacks_used, 0);
        assert_eq!(negotiated.configuration.label, "env-exact");
        assert!(negotiated.source.is_live());
        assert_eq!(backend.attempted(), vec!["env-exact".to_string()]);
    }

    #[tokio::test]
    async fn permission_rejection_stops_the_walk() {
        let backend = FakeBackend::new().with_open_results(vec![Err(RawDeviceError::new(
            "NotAllowedError",
            "Permission denied by user",
        ))]);
        let result = DeviceNegotiator::new(&backend)
            .negotiate(&CaptureConfiguration::default_priority_list())
            .await;

        assert_eq!(result.err(), Some(FaultCategory::PermissionDenied));
        assert_eq!(backend.attempted(), vec!["env-exact".to_string()]);
        assert!(backend.opened().is_empty());
    }

    #[tokio::test]
    async fn falls_back_in_priority_order() {
        let backend = FakeBackend::new().with_open_results(vec![
            Err(RawDeviceError::new("OverconstrainedError", "facingMode")),
            Err(RawDeviceError::new("NotReadableError", "in use")),
        ]);
        let negotiated = DeviceNegotiator::new(&backend)
            .negotiate(&CaptureConfiguration::default_priority_list())
            .await
            .unwrap_or_else(|c| panic!("negotiation failed: {}", c));

        assert_eq!(negotiated.fallbacks_used, 2);
        assert_eq!(negotiated.configuration.label, "user");
        assert_eq!(backend.attempted(), labels()[..3].to_vec());
    }

    #[tokio::test]
    async fn reports_most_specific_failure() {
        let backend = FakeBackend::new().with_open_results(vec![
            Err(RawDeviceError::new("OverconstrainedError", "")),
            Err(RawDeviceError::new("NotFoundError", "")),
            Err(RawDeviceError::new("OverconstrainedError", "")),
            Err(RawDeviceError::new("Mystery", "")),
        ]);
        let result = DeviceNegotiator::new(&backend)
            .negotiate(&CaptureConfiguration::default_priority_list())
            .await;

        assert_eq!(result.err(), Some(FaultCategory::DeviceNotFound));
        assert_eq!(backend.attempted(), labels());
    }

    #[tokio::test]
    async fn insecure_context_never_touches_devices() {
        let backend = FakeBackend::new().insecure();
        let result = DeviceNegotiator::new(&backend)
            .negotiate(&CaptureConfiguration::default_priority_list())
            .await;

        assert_eq!(result.err(), Some(FaultCategory::InsecureContext));
        assert!(backend.attempted().is_empty());
    }

    #[tokio::test]
    async fn empty_list_is_unsupported() {
        let backend = FakeBackend::new();
        let result = DeviceNegotiator::new(&backend).negotiate(&[]).await;
        assert_eq!(result.err(), Some(FaultCategory::Unsupported));
    }
}
