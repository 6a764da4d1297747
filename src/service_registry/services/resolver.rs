//! Maps capability keys onto live backend instances.

use crate::service_registry::{
    domain::{ServiceTarget, ServiceType},
    ports::{ServiceRegistry, ServiceRegistryResult},
};
use std::sync::Arc;
use tracing::debug;

/// Chooses one target among replicas matching the same key.
///
/// Implementations must return the same target for the same candidate set.
pub trait SelectionPolicy: Send + Sync {
    /// Picks one target from `candidates`, or `None` when there are none.
    fn select(&self, candidates: Vec<ServiceTarget>) -> Option<ServiceTarget>;
}

/// Selects the earliest-registered target, breaking ties by identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstRegistered;

impl SelectionPolicy for FirstRegistered {
    fn select(&self, candidates: Vec<ServiceTarget>) -> Option<ServiceTarget> {
        candidates.into_iter().min_by(|left, right| {
            left.registered_at()
                .cmp(&right.registered_at())
                .then_with(|| left.id().cmp(&right.id()))
        })
    }
}

/// Resolves capability requests to registered backend instances.
///
/// A miss is reported as `Ok(None)`; callers treat it as "service not found"
/// and never retry.
#[derive(Clone)]
pub struct ServiceResolver<R, P = FirstRegistered>
where
    R: ServiceRegistry,
    P: SelectionPolicy,
{
    registry: Arc<R>,
    policy: P,
}

impl<R> ServiceResolver<R, FirstRegistered>
where
    R: ServiceRegistry,
{
    /// Creates a resolver using the first-registered policy.
    #[must_use]
    pub const fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            policy: FirstRegistered,
        }
    }
}

impl<R, P> ServiceResolver<R, P>
where
    R: ServiceRegistry,
    P: SelectionPolicy,
{
    /// Creates a resolver with a custom selection policy.
    #[must_use]
    pub const fn with_policy(registry: Arc<R>, policy: P) -> Self {
        Self { registry, policy }
    }

    /// Resolves a target by service name and type.
    ///
    /// # Errors
    ///
    /// Returns registry errors; an empty registry is not an error.
    pub async fn resolve(
        &self,
        service_name: &str,
        service_type: ServiceType,
    ) -> ServiceRegistryResult<Option<ServiceTarget>> {
        let candidates: Vec<ServiceTarget> = self
            .registry
            .entries(service_type)
            .await?
            .into_iter()
            .filter(|target| target.service_name() == service_name)
            .collect();
        let replicas = candidates.len();
        let selected = self.policy.select(candidates);
        debug!(
            service = service_name,
            service_type = %service_type,
            replicas,
            target = ?selected.as_ref().map(ServiceTarget::address),
            "resolved service target"
        );
        Ok(selected)
    }

    /// Resolves a target by type, sub-type and name.
    ///
    /// Code-execution engines register the engine type as their sub-type and
    /// the language as their service name.
    ///
    /// # Errors
    ///
    /// Returns registry errors; an empty registry is not an error.
    pub async fn resolve_code_execution(
        &self,
        service_type: ServiceType,
        engine_type: &str,
        language: &str,
    ) -> ServiceRegistryResult<Option<ServiceTarget>> {
        let candidates: Vec<ServiceTarget> = self
            .registry
            .entries(service_type)
            .await?
            .into_iter()
            .filter(|target| {
                target.service_sub_type() == Some(engine_type) && target.service_name() == language
            })
            .collect();
        let replicas = candidates.len();
        let selected = self.policy.select(candidates);
        debug!(
            engine = engine_type,
            language,
            replicas,
            target = ?selected.as_ref().map(ServiceTarget::address),
            "resolved code execution target"
        );
        Ok(selected)
    }
}
