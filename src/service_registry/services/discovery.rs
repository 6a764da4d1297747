//! Backend registration, pings and state reports.

use super::{RegistryServiceError, RegistryServiceResult};
use crate::events::{EventPublisher, EventType, ServiceTargetEvent};
use crate::service_registry::{
    domain::{HealthStatus, ServiceState, ServiceTarget, ServiceTargetId},
    ports::ServiceRegistry,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Handles backend instances announcing themselves and their liveness.
///
/// Every accepted change is published as a [`ServiceTargetEvent`].
#[derive(Clone)]
pub struct DiscoveryService<R, C>
where
    R: ServiceRegistry,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    publisher: EventPublisher,
    clock: Arc<C>,
}

impl<R, C> DiscoveryService<R, C>
where
    R: ServiceRegistry,
    C: Clock + Send + Sync,
{
    /// Creates a discovery service.
    #[must_use]
    pub const fn new(registry: Arc<R>, publisher: EventPublisher, clock: Arc<C>) -> Self {
        Self {
            registry,
            publisher,
            clock,
        }
    }

    async fn find_target_or_error(
        &self,
        id: ServiceTargetId,
    ) -> RegistryServiceResult<ServiceTarget> {
        self.registry
            .find_by_id(id)
            .await?
            .ok_or(RegistryServiceError::NotFound(id))
    }

    /// Registers a backend instance, replacing any earlier registration with
    /// the same identifier.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn register(&self, target: &ServiceTarget) -> RegistryServiceResult<()> {
        self.registry.register(target).await?;
        info!(
            id = %target.id(),
            service = target.service_name(),
            service_type = %target.service_type(),
            address = %target.address(),
            "registered service target"
        );
        self.publisher
            .publish(ServiceTargetEvent::for_target(EventType::Register, target));
        Ok(())
    }

    /// Deregisters a backend instance.
    ///
    /// Returns `None` without publishing when the instance was not registered.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn deregister(
        &self,
        id: ServiceTargetId,
    ) -> RegistryServiceResult<Option<ServiceTarget>> {
        let removed = self.registry.deregister(id, self.clock.utc()).await?;
        if let Some(target) = &removed {
            info!(id = %id, service = target.service_name(), "deregistered service target");
            self.publisher
                .publish(ServiceTargetEvent::for_target(EventType::Deregister, target));
        }
        Ok(removed)
    }

    /// Records a ping from a registered instance.
    ///
    /// Returns `false` when the ping lost a last-write-wins race.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] for unknown instances, or
    /// registry errors.
    pub async fn ping(&self, id: ServiceTargetId) -> RegistryServiceResult<bool> {
        let target = self.find_target_or_error(id).await?;
        let accepted = self.registry.ping(id, self.clock.utc()).await?;
        debug!(id = %id, accepted, "ping");
        if accepted {
            self.publisher
                .publish(ServiceTargetEvent::for_target(EventType::Ping, &target));
        }
        Ok(accepted)
    }

    /// Records a state reported by a registered instance.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] for unknown instances, or
    /// registry errors.
    pub async fn update_state(
        &self,
        id: ServiceTargetId,
        health_status: HealthStatus,
        reason: Option<String>,
    ) -> RegistryServiceResult<bool> {
        let target = self.find_target_or_error(id).await?;
        let observation = ServiceState::new(self.clock.utc(), health_status, reason);
        let accepted = self.registry.record_state(id, observation).await?;
        debug!(id = %id, status = %health_status, accepted, "state update");
        if accepted {
            self.publisher
                .publish(ServiceTargetEvent::for_target(EventType::Update, &target));
        }
        Ok(accepted)
    }

    /// Returns the recorded state history of a registered instance.
    ///
    /// An instance that never reported yields a single missing-in-action
    /// state stamped with its registration time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotFound`] for unknown instances, or
    /// registry errors.
    pub async fn states(&self, id: ServiceTargetId) -> RegistryServiceResult<Vec<ServiceState>> {
        let target = self.find_target_or_error(id).await?;
        let history = self
            .registry
            .activity(id)
            .await?
            .map(|record| record.states().to_vec())
            .unwrap_or_default();
        if history.is_empty() {
            return Ok(vec![ServiceState::missing_in_action(target.registered_at())]);
        }
        Ok(history)
    }
}
