//! In-memory service registry.

use crate::service_registry::{
    domain::{
        ActivityRecord, HealthStatus, ServiceState, ServiceTarget, ServiceTargetId, ServiceType,
    },
    ports::{ServiceRegistry, ServiceRegistryError, ServiceRegistryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default number of state observations kept per activity record.
pub const DEFAULT_MAX_STATE_COUNT: usize = 10;

/// Thread-safe in-memory registry of backend instances.
#[derive(Debug, Clone)]
pub struct InMemoryServiceRegistry {
    state: Arc<RwLock<InMemoryRegistryState>>,
    max_state_count: usize,
}

#[derive(Debug, Default)]
struct InMemoryRegistryState {
    targets: HashMap<ServiceTargetId, ServiceTarget>,
    activity: HashMap<ServiceTargetId, ActivityRecord>,
}

impl Default for InMemoryServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryServiceRegistry {
    /// Creates an empty registry keeping the default state history length.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_state_count(DEFAULT_MAX_STATE_COUNT)
    }

    /// Creates an empty registry keeping at most `max_state_count` states
    /// per instance.
    #[must_use]
    pub fn with_max_state_count(max_state_count: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryRegistryState::default())),
            max_state_count,
        }
    }

    /// Seeds an activity record directly, bypassing last-write-wins checks.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn put_activity(&self, record: ActivityRecord) -> ServiceRegistryResult<()> {
        let mut state = self.write()?;
        state.activity.insert(record.id(), record);
        Ok(())
    }

    fn read(&self) -> ServiceRegistryResult<RwLockReadGuard<'_, InMemoryRegistryState>> {
        self.state.read().map_err(|err| {
            ServiceRegistryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ServiceRegistryResult<RwLockWriteGuard<'_, InMemoryRegistryState>> {
        self.state.write().map_err(|err| {
            ServiceRegistryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ServiceRegistry for InMemoryServiceRegistry {
    async fn register(&self, target: &ServiceTarget) -> ServiceRegistryResult<()> {
        let mut state = self.write()?;
        state.targets.insert(target.id(), target.clone());
        Ok(())
    }

    async fn deregister(
        &self,
        id: ServiceTargetId,
        at: DateTime<Utc>,
    ) -> ServiceRegistryResult<Option<ServiceTarget>> {
        let mut state = self.write()?;
        let removed = state.targets.remove(&id);
        if removed.is_some() {
            let max_states = self.max_state_count;
            state
                .activity
                .entry(id)
                .or_insert_with(|| ActivityRecord::with_status(id, at, HealthStatus::Down))
                .record_deregistration(at, max_states);
        }
        Ok(removed)
    }

    async fn find_by_id(
        &self,
        id: ServiceTargetId,
    ) -> ServiceRegistryResult<Option<ServiceTarget>> {
        let state = self.read()?;
        Ok(state.targets.get(&id).cloned())
    }

    async fn entries(
        &self,
        service_type: ServiceType,
    ) -> ServiceRegistryResult<Vec<ServiceTarget>> {
        let state = self.read()?;
        Ok(state
            .targets
            .values()
            .filter(|target| target.service_type() == service_type)
            .cloned()
            .collect())
    }

    async fn all_entries(&self) -> ServiceRegistryResult<Vec<ServiceTarget>> {
        let state = self.read()?;
        Ok(state.targets.values().cloned().collect())
    }

    async fn activity(&self, id: ServiceTargetId) -> ServiceRegistryResult<Option<ActivityRecord>> {
        let state = self.read()?;
        Ok(state.activity.get(&id).cloned())
    }

    async fn ping(&self, id: ServiceTargetId, at: DateTime<Utc>) -> ServiceRegistryResult<bool> {
        let mut state = self.write()?;
        if let Some(record) = state.activity.get_mut(&id) {
            return Ok(record.record_ping(at));
        }
        state.activity.insert(id, ActivityRecord::first_ping(id, at));
        Ok(true)
    }

    async fn record_state(
        &self,
        id: ServiceTargetId,
        observation: ServiceState,
    ) -> ServiceRegistryResult<bool> {
        let mut state = self.write()?;
        let max_states = self.max_state_count;
        let record = state.activity.entry(id).or_insert_with(|| {
            ActivityRecord::with_status(id, observation.timestamp(), HealthStatus::Pending)
        });
        Ok(record.record_state(observation, max_states))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use mockable::DefaultClock;

    fn target(name: &str, service_type: ServiceType) -> ServiceTarget {
        ServiceTarget::new(name, "localhost", 9190, service_type, &DefaultClock)
            .expect("valid target")
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn entries_are_partitioned_by_type() {
        let registry = InMemoryServiceRegistry::new();
        registry
            .register(&target("http", ServiceType::ToolInvoker))
            .await
            .expect("register tool invoker");
        registry
            .register(&target("file", ServiceType::ResourceProvider))
            .await
            .expect("register resource provider");

        let tools = registry
            .entries(ServiceType::ToolInvoker)
            .await
            .expect("list tool invokers");

        assert_eq!(tools.len(), 1);
        assert_eq!(
            tools.first().map(ServiceTarget::service_name),
            Some("http")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_ping_creates_healthy_record() {
        let registry = InMemoryServiceRegistry::new();
        let id = ServiceTargetId::new();

        assert!(registry.ping(id, noon()).await.expect("ping succeeds"));

        let record = registry
            .activity(id)
            .await
            .expect("lookup succeeds")
            .expect("record should exist");
        assert_eq!(record.health_status(), HealthStatus::Healthy);
        assert_eq!(record.last_seen(), noon());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deregistration_marks_activity_down() {
        let registry = InMemoryServiceRegistry::new();
        let registered = target("http", ServiceType::ToolInvoker);
        registry.register(&registered).await.expect("register");
        registry
            .ping(registered.id(), noon())
            .await
            .expect("ping succeeds");

        let removed = registry
            .deregister(registered.id(), noon() + Duration::minutes(1))
            .await
            .expect("deregister succeeds");

        assert_eq!(removed.as_ref().map(ServiceTarget::id), Some(registered.id()));
        let record = registry
            .activity(registered.id())
            .await
            .expect("lookup succeeds")
            .expect("record should exist");
        assert!(!record.is_active());
        assert_eq!(record.health_status(), HealthStatus::Down);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deregistering_unknown_target_is_a_no_op() {
        let registry = InMemoryServiceRegistry::new();

        let removed = registry
            .deregister(ServiceTargetId::new(), noon())
            .await
            .expect("deregister succeeds");

        assert!(removed.is_none());
    }
}
