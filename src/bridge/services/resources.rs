//! Routing resource reads to resource-provider backends.

use super::ProvisioningService;
use crate::bridge::{
    domain::{
        BridgeError, BridgeResult, ERROR_MIME_TYPE, ResourceArguments, ResourceContent,
        ResourceReply, ResourceRequest,
    },
    ports::BridgeTransport,
};
use crate::capability::{
    domain::{CallableReference, ProvisioningReference, ResourcePayload, ResourceReference},
    ports::{PayloadProvisioner, ProvisionerError},
};
use crate::service_registry::{
    domain::{ServiceTarget, ServiceType},
    ports::ServiceRegistry,
    services::{FirstRegistered, SelectionPolicy, ServiceResolver},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

const RESOURCE_ERROR_FALLBACK: &str = "resource acquisition failed";

fn build_request(resource: &ResourceReference) -> ResourceRequest {
    ResourceRequest {
        location: resource.location().to_owned(),
        resource_type: resource.capability_type().to_owned(),
        name: resource.name().to_owned(),
        configuration_uri: resource.configuration_uri().unwrap_or_default().to_owned(),
        secrets_uri: resource.secrets_uri().unwrap_or_default().to_owned(),
        params: resource
            .params()
            .iter()
            .map(|param| (param.name.clone(), param.value.clone()))
            .collect(),
    }
}

fn into_contents(
    reply: ResourceReply,
    arguments: &ResourceArguments,
    resource: &ResourceReference,
) -> Vec<ResourceContent> {
    if reply.is_error {
        error!(
            resource = resource.name(),
            uri = %arguments.request_uri,
            "unable to acquire resource"
        );
        let message = reply
            .content
            .into_iter()
            .next()
            .unwrap_or_else(|| RESOURCE_ERROR_FALLBACK.to_owned());
        return vec![ResourceContent::text(
            &arguments.request_uri,
            message,
            ERROR_MIME_TYPE,
        )];
    }
    reply
        .content
        .into_iter()
        .map(|text| ResourceContent::text(&arguments.request_uri, text, resource.mime_type()))
        .collect()
}

/// Bridge for resources: provisioning plus acquisition.
pub struct ResourceBridge<R, T, P = FirstRegistered>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    resolver: Arc<ServiceResolver<R, P>>,
    transport: Arc<T>,
    provisioning: ProvisioningService<T>,
}

impl<R, T, P> ResourceBridge<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// Creates a resource bridge.
    #[must_use]
    pub fn new(resolver: Arc<ServiceResolver<R, P>>, transport: Arc<T>) -> Self {
        Self {
            resolver,
            provisioning: ProvisioningService::new(Arc::clone(&transport)),
            transport,
        }
    }

    async fn resolve(&self, resource_type: &str) -> BridgeResult<ServiceTarget> {
        debug!(resource_type, "resolving resource provider");
        self.resolver
            .resolve(resource_type, ServiceType::ResourceProvider)
            .await?
            .ok_or_else(|| BridgeError::NotFound {
                capability: resource_type.to_owned(),
                service_type: ServiceType::ResourceProvider,
            })
    }

    /// Provisions the backend serving a resource payload.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no backend serves the resource
    /// type or [`BridgeError::Unavailable`] when provisioning fails.
    pub async fn provision(
        &self,
        payload: &ResourcePayload,
    ) -> BridgeResult<ProvisioningReference> {
        let resource = payload.payload();
        let target = self.resolve(resource.capability_type()).await?;
        self.provisioning
            .provision(
                resource.name(),
                payload.configuration_data(),
                payload.secrets_data(),
                &target,
            )
            .await
    }

    /// Reads a resource, surfacing routing failures as errors.
    ///
    /// A reply flagged as an error yields one `text/plain` error item rather
    /// than an `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no backend serves the resource
    /// type or [`BridgeError::Unavailable`] when the transport fails.
    pub async fn try_eval(
        &self,
        arguments: &ResourceArguments,
        resource: &ResourceReference,
    ) -> BridgeResult<Vec<ResourceContent>> {
        let target = self.resolve(resource.capability_type()).await?;
        info!(resource = resource.name(), address = %target.address(), "requesting resource");
        let reply = self
            .transport
            .acquire_resource(&build_request(resource), &target)
            .await
            .map_err(|source| BridgeError::Unavailable {
                address: target.address(),
                source,
            })?;
        Ok(into_contents(reply, arguments, resource))
    }

    /// Reads a resource, turning every failure into a single error item.
    pub async fn eval(
        &self,
        arguments: &ResourceArguments,
        resource: &ResourceReference,
    ) -> Vec<ResourceContent> {
        match self.try_eval(arguments, resource).await {
            Ok(contents) => contents,
            Err(err) => {
                error!(
                    resource = resource.name(),
                    kind = %err.kind(),
                    error = %err,
                    "resource read failed"
                );
                err.into_resource_contents(&arguments.request_uri)
            }
        }
    }
}

#[async_trait]
impl<R, T, P> PayloadProvisioner<ResourceReference> for ResourceBridge<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    async fn provision(
        &self,
        payload: &ResourcePayload,
    ) -> Result<ProvisioningReference, ProvisionerError> {
        Self::provision(self, payload).await.map_err(ProvisionerError::from)
    }
}
