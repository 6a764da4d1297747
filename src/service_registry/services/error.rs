//! Errors shared by the service registry services.

use crate::error::ErrorKind;
use crate::service_registry::{
    domain::{ServiceRegistryDomainError, ServiceTargetId},
    ports::ServiceRegistryError,
};
use thiserror::Error;

/// Service-level errors for registration, liveness and cleanup operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ServiceRegistryDomainError),
    /// Registry operation failed.
    #[error(transparent)]
    Registry(#[from] ServiceRegistryError),
    /// No target exists with the given identifier.
    #[error("service target {0} not found")]
    NotFound(ServiceTargetId),
}

impl RegistryServiceError {
    /// Returns the error's taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::MalformedRequest,
            Self::NotFound(_) | Self::Registry(ServiceRegistryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Registry(ServiceRegistryError::Persistence(_)) => ErrorKind::Internal,
        }
    }
}

/// Result type for service registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;
