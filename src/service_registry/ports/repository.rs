//! Registry port for backend registrations and their activity records.

use crate::service_registry::domain::{
    ActivityRecord, ServiceState, ServiceTarget, ServiceTargetId, ServiceType,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for service registry operations.
pub type ServiceRegistryResult<T> = Result<T, ServiceRegistryError>;

/// Storage contract for registered backend instances.
///
/// Writes are atomic per target identifier; implementations must not hold
/// locks across the returned futures' suspension points.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Stores a target, replacing any existing target with the same
    /// identifier.
    async fn register(&self, target: &ServiceTarget) -> ServiceRegistryResult<()>;

    /// Removes a target and marks its activity record as down.
    ///
    /// Returns the removed target, or `None` when it was not registered.
    async fn deregister(
        &self,
        id: ServiceTargetId,
        at: DateTime<Utc>,
    ) -> ServiceRegistryResult<Option<ServiceTarget>>;

    /// Finds a target by identifier.
    async fn find_by_id(&self, id: ServiceTargetId) -> ServiceRegistryResult<Option<ServiceTarget>>;

    /// Returns all targets of the given type.
    async fn entries(&self, service_type: ServiceType) -> ServiceRegistryResult<Vec<ServiceTarget>>;

    /// Returns all targets regardless of type.
    async fn all_entries(&self) -> ServiceRegistryResult<Vec<ServiceTarget>>;

    /// Returns the activity record for a target, if it ever pinged or
    /// reported.
    async fn activity(&self, id: ServiceTargetId) -> ServiceRegistryResult<Option<ActivityRecord>>;

    /// Records a ping, creating the activity record on the first one.
    ///
    /// Returns `false` when the ping was older than the stored record.
    async fn ping(&self, id: ServiceTargetId, at: DateTime<Utc>) -> ServiceRegistryResult<bool>;

    /// Appends a state observation to a target's activity record.
    ///
    /// Returns `false` when the observation was older than the stored record.
    async fn record_state(
        &self,
        id: ServiceTargetId,
        state: ServiceState,
    ) -> ServiceRegistryResult<bool>;
}

/// Errors returned by service registry implementations.
#[derive(Debug, Clone, Error)]
pub enum ServiceRegistryError {
    /// The target was not found.
    #[error("service target not found: {0}")]
    NotFound(ServiceTargetId),

    /// Storage-layer failure.
    #[error("service registry persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ServiceRegistryError {
    /// Wraps a storage-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
