//! Health probe port used by periodic health checks.

use crate::service_registry::domain::{HealthStatus, ServiceTarget};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Probes a backend instance for its current health.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns the instance's health as reported by the instance itself.
    async fn probe(&self, target: &ServiceTarget) -> Result<HealthStatus, HealthProbeError>;
}

/// Errors raised while probing a backend instance.
#[derive(Debug, Clone, Error)]
pub enum HealthProbeError {
    /// The instance could not be reached within the probe deadline.
    #[error("health probe to {address} timed out")]
    Timeout {
        /// Probed address.
        address: String,
    },

    /// Any other probe failure.
    #[error("health probe to {address} failed: {reason}")]
    Failed {
        /// Probed address.
        address: String,
        /// Underlying failure.
        reason: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl HealthProbeError {
    /// Wraps a probe failure for `address`.
    pub fn failed(
        address: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            address: address.into(),
            reason: Arc::new(err),
        }
    }
}
