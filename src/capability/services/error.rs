//! Errors shared by capability services.

use crate::capability::{
    domain::CapabilityDomainError,
    ports::{CapabilityManagerError, CapabilityRepositoryError, ProvisionerError},
};
use crate::error::ErrorKind;
use crate::label_expression::LabelExpressionError;
use thiserror::Error;

/// Service-level errors for catalog and label operations.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] CapabilityDomainError),
    /// A label filter failed to parse.
    #[error(transparent)]
    Expression(#[from] LabelExpressionError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CapabilityRepositoryError),
    /// The protocol server rejected a registration.
    #[error(transparent)]
    Manager(#[from] CapabilityManagerError),
    /// Provisioning the backend failed.
    #[error(transparent)]
    Provisioning(#[from] ProvisionerError),
    /// No capability exists with the given name.
    #[error("{kind} {name} not found")]
    NotFound {
        /// Capability kind.
        kind: &'static str,
        /// Missing name.
        name: String,
    },
}

impl CatalogServiceError {
    /// Returns the error's taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::MalformedRequest,
            Self::Expression(_) => ErrorKind::InvalidExpression,
            Self::Repository(CapabilityRepositoryError::AlreadyExists { .. }) => {
                ErrorKind::AlreadyExists
            }
            Self::NotFound { .. }
            | Self::Repository(CapabilityRepositoryError::NotFound { .. })
            | Self::Provisioning(ProvisionerError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Provisioning(ProvisionerError::Unavailable { .. }) => ErrorKind::Unavailable,
            Self::Repository(CapabilityRepositoryError::Persistence(_))
            | Self::Manager(_)
            | Self::Provisioning(ProvisionerError::Failed(_)) => ErrorKind::Internal,
        }
    }
}

/// Result type for capability service operations.
pub type CatalogServiceResult<T> = Result<T, CatalogServiceError>;
