//! Bridge failures and their mapping onto agent-facing responses.

use super::{ResourceContent, ToolResponse};
use crate::bridge::ports::TransportError;
use crate::capability::ports::ProvisionerError;
use crate::error::ErrorKind;
use crate::service_registry::{domain::ServiceType, ports::ServiceRegistryError};
use thiserror::Error;

/// MIME type of error content returned for failed resource reads.
pub const ERROR_MIME_TYPE: &str = "text/plain";

/// Errors raised while routing a capability call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No registered backend serves the capability.
    #[error("there is no host registered for {service_type} service {capability}")]
    NotFound {
        /// Capability type or engine/language key that failed to resolve.
        capability: String,
        /// Backend kind searched.
        service_type: ServiceType,
    },

    /// The resolved backend could not be reached or failed at transport
    /// level.
    #[error("service at {address} is unavailable: {source}")]
    Unavailable {
        /// Backend address.
        address: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// A header property has neither a default nor a caller-supplied value.
    #[error("malformed value for key {key}: neither a default value nor an argument were provided")]
    MalformedRequest {
        /// Property key.
        key: String,
    },

    /// The registry failed while resolving.
    #[error(transparent)]
    Registry(#[from] ServiceRegistryError),
}

impl BridgeError {
    /// Returns the error's taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::MalformedRequest { .. } => ErrorKind::MalformedRequest,
            Self::Registry(_) => ErrorKind::Internal,
        }
    }

    /// Converts the failure into an error-flagged tool response.
    #[must_use]
    pub fn into_tool_response(self) -> ToolResponse {
        ToolResponse::error(self.to_string())
    }

    /// Converts the failure into the single error item of a resource read.
    #[must_use]
    pub fn into_resource_contents(self, request_uri: &str) -> Vec<ResourceContent> {
        vec![ResourceContent::text(
            request_uri,
            self.to_string(),
            ERROR_MIME_TYPE,
        )]
    }
}

impl From<BridgeError> for ProvisionerError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::NotFound { capability, .. } => Self::NotFound {
                capability_type: capability,
            },
            BridgeError::Unavailable { address, source } => Self::Unavailable {
                address,
                reason: source.to_string(),
            },
            other @ (BridgeError::MalformedRequest { .. } | BridgeError::Registry(_)) => {
                Self::Failed(other.to_string())
            }
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
