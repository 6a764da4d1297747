//! Repository port for exposed capabilities.

use crate::capability::domain::CallableReference;
use crate::label_expression::LabelExpression;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for capability repository operations.
pub type CapabilityRepositoryResult<T> = Result<T, CapabilityRepositoryError>;

/// Persistence contract for callable references keyed by unique name.
#[async_trait]
pub trait CapabilityRepository<E: CallableReference>: Send + Sync {
    /// Stores a new capability.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRepositoryError::AlreadyExists`] when the name is
    /// already stored.
    async fn persist(&self, capability: &E) -> CapabilityRepositoryResult<()>;

    /// Replaces a stored capability with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityRepositoryError::NotFound`] when the name is not
    /// stored.
    async fn update(&self, capability: &E) -> CapabilityRepositoryResult<()>;

    /// Finds a capability by name.
    async fn find_by_name(&self, name: &str) -> CapabilityRepositoryResult<Option<E>>;

    /// Returns every stored capability in name order.
    async fn list_all(&self) -> CapabilityRepositoryResult<Vec<E>>;

    /// Returns the capabilities whose labels satisfy `filter`.
    async fn list_matching(&self, filter: &LabelExpression) -> CapabilityRepositoryResult<Vec<E>>;

    /// Removes a capability by name, returning it when it was stored.
    async fn remove_by_name(&self, name: &str) -> CapabilityRepositoryResult<Option<E>>;

    /// Removes every capability whose labels satisfy `filter`, returning the
    /// removed capabilities.
    async fn remove_if(&self, filter: &LabelExpression) -> CapabilityRepositoryResult<Vec<E>>;
}

/// Errors returned by capability repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CapabilityRepositoryError {
    /// A capability with the same name is already stored.
    #[error("{kind} already exists: {name}")]
    AlreadyExists {
        /// Capability kind.
        kind: &'static str,
        /// Duplicate name.
        name: String,
    },

    /// No capability with the name is stored.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Capability kind.
        kind: &'static str,
        /// Missing name.
        name: String,
    },

    /// Storage-layer failure.
    #[error("capability persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CapabilityRepositoryError {
    /// Builds a duplicate-name error for `E`.
    pub fn already_exists<E: CallableReference>(name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: E::KIND,
            name: name.into(),
        }
    }

    /// Builds a missing-name error for `E`.
    pub fn not_found<E: CallableReference>(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: E::KIND,
            name: name.into(),
        }
    }

    /// Wraps a storage-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
