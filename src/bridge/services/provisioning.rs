//! Shipping configuration and secrets to a resolved backend.

use crate::bridge::{
    domain::{BridgeError, BridgeResult, NamedBlob, ProvisionRequest},
    ports::BridgeTransport,
};
use crate::capability::domain::ProvisioningReference;
use crate::service_registry::domain::ServiceTarget;
use std::sync::Arc;
use tracing::{debug, error};

/// Provisions backends ahead of invocation.
///
/// Failures are terminal: nothing is retried or cached.
pub struct ProvisioningService<T: BridgeTransport> {
    transport: Arc<T>,
}

impl<T: BridgeTransport> Clone for ProvisioningService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: BridgeTransport> ProvisioningService<T> {
    /// Creates a provisioning service.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Ships `configuration_data` and `secrets_data`, both stored under
    /// `name`, to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unavailable`] carrying the target address when
    /// the transport fails.
    pub async fn provision(
        &self,
        name: &str,
        configuration_data: &str,
        secrets_data: &str,
        target: &ServiceTarget,
    ) -> BridgeResult<ProvisioningReference> {
        let address = target.address();
        debug!(name, address, "provisioning configuration");
        let request = ProvisionRequest {
            configuration: NamedBlob {
                name: name.to_owned(),
                payload: configuration_data.to_owned(),
            },
            secret: NamedBlob {
                name: name.to_owned(),
                payload: secrets_data.to_owned(),
            },
        };

        match self.transport.provision(&request, target).await {
            Ok(reply) => {
                debug!(
                    name,
                    configuration_uri = %reply.configuration_uri,
                    secret_uri = %reply.secret_uri,
                    "provisioned configuration"
                );
                Ok(ProvisioningReference::new(
                    reply.configuration_uri,
                    reply.secret_uri,
                    reply.properties,
                ))
            }
            Err(source) => {
                error!(name, address, error = %source, "failed to provision configuration");
                Err(BridgeError::Unavailable { address, source })
            }
        }
    }
}
