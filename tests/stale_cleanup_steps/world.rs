//! Shared world state for stale cleanup BDD scenarios.

use crate::test_helpers::{FixedClock, init_tracing, target};
use capability_router::{
    events::{EventPublisher, ServiceTargetEvent},
    service_registry::{
        adapters::memory::InMemoryServiceRegistry,
        domain::{ServiceTarget, ServiceType},
        services::{CleanupOutcome, StaleCleanupService},
    },
};
use chrono::Duration;
use rstest::fixture;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Scenario world for stale cleanup behaviour tests.
pub struct CleanupWorld {
    /// Clock shared by the registry services.
    pub clock: FixedClock,
    /// Backend registry.
    pub registry: Arc<InMemoryServiceRegistry>,
    /// The cleanup service under test.
    pub service: StaleCleanupService<InMemoryServiceRegistry, FixedClock>,
    /// Receiver subscribed before any step runs.
    pub events: broadcast::Receiver<ServiceTargetEvent>,
    /// Registered backends by service name.
    pub targets: BTreeMap<String, ServiceTarget>,
    /// Result of the last cleanup run.
    pub last_outcome: Option<CleanupOutcome>,
}

impl CleanupWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let clock = FixedClock::default();
        let registry = Arc::new(InMemoryServiceRegistry::new());
        let publisher = EventPublisher::default();
        let events = publisher.subscribe();
        let service =
            StaleCleanupService::new(Arc::clone(&registry), publisher, Arc::new(clock.clone()));
        Self {
            clock,
            registry,
            service,
            events,
            targets: BTreeMap::new(),
            last_outcome: None,
        }
    }

    /// Builds a backend whose registration is stamped `days` ago.
    pub fn backend_registered_days_ago(
        &self,
        name: &str,
        service_type: ServiceType,
        days: i64,
    ) -> ServiceTarget {
        let past = FixedClock::default();
        past.advance(-Duration::days(days));
        target(name, name, service_type, &past)
    }

    /// Returns the backend registered under `name`.
    pub fn target(&self, name: &str) -> Result<&ServiceTarget, eyre::Report> {
        self.targets
            .get(name)
            .ok_or_else(|| eyre::eyre!("no backend named '{name}' in scenario world"))
    }
}

impl Default for CleanupWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CleanupWorld {
    CleanupWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
