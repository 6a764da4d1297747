//! Port for provisioning a capability's backend before exposing it.

use crate::capability::domain::{CapabilityPayload, ProvisioningReference};
use async_trait::async_trait;
use thiserror::Error;

/// Ships a payload's configuration and secrets to the backend that serves it.
#[async_trait]
pub trait PayloadProvisioner<E>: Send + Sync
where
    E: Send + Sync,
{
    /// Provisions the payload, returning the URIs the backend assigned.
    async fn provision(
        &self,
        payload: &CapabilityPayload<E>,
    ) -> Result<ProvisioningReference, ProvisionerError>;
}

/// Errors raised while provisioning a payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProvisionerError {
    /// No registered backend serves the capability type.
    #[error("no registered backend serves capability type {capability_type}")]
    NotFound {
        /// Capability type that failed to resolve.
        capability_type: String,
    },

    /// The resolved backend could not be reached.
    #[error("backend at {address} is unavailable: {reason}")]
    Unavailable {
        /// Backend address.
        address: String,
        /// Transport failure description.
        reason: String,
    },

    /// Provisioning failed for another reason.
    #[error("provisioning failed: {0}")]
    Failed(String),
}
