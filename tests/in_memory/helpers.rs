//! Gateway wiring shared by the in-memory tests.

use crate::test_helpers::{FixedClock, init_tracing, target};
use capability_router::{
    bridge::{adapters::memory::InMemoryTransport, services::Bridges},
    capability::{
        adapters::memory::{InMemoryCapabilityRepository, RecordingCapabilityManager},
        domain::{ResourceReference, ToolReference},
        services::CapabilityCatalog,
    },
    config::RouterConfig,
    events::{EventPublisher, ToolCallPublisher},
    service_registry::{
        adapters::memory::InMemoryServiceRegistry,
        domain::{ServiceTarget, ServiceType},
        services::{DiscoveryService, ServiceResolver, StaleCleanupService},
    },
};
use rstest::fixture;
use std::sync::Arc;

/// Catalog of tools over in-memory adapters.
pub type ToolCatalog = CapabilityCatalog<
    ToolReference,
    InMemoryCapabilityRepository<ToolReference>,
    RecordingCapabilityManager<ToolReference>,
>;

/// Catalog of resources over in-memory adapters.
pub type ResourceCatalog = CapabilityCatalog<
    ResourceReference,
    InMemoryCapabilityRepository<ResourceReference>,
    RecordingCapabilityManager<ResourceReference>,
>;

/// A fully wired gateway over in-memory adapters.
pub struct Gateway {
    /// Configuration the gateway was wired from.
    pub config: RouterConfig,
    /// Clock shared by every service.
    pub clock: FixedClock,
    /// Registry event publisher.
    pub publisher: EventPublisher,
    /// Tool call event publisher.
    pub tool_calls: ToolCallPublisher,
    /// Backend registry.
    pub registry: Arc<InMemoryServiceRegistry>,
    /// Loopback transport.
    pub transport: Arc<InMemoryTransport>,
    /// Backend registration.
    pub discovery: DiscoveryService<InMemoryServiceRegistry, FixedClock>,
    /// Stale registration cleanup.
    pub cleanup: StaleCleanupService<InMemoryServiceRegistry, FixedClock>,
    /// Bridges by capability kind.
    pub bridges: Bridges<InMemoryServiceRegistry, InMemoryTransport>,
    /// Tool storage behind the tool catalog.
    pub tool_repository: Arc<InMemoryCapabilityRepository<ToolReference>>,
    /// Tool exposure recorder.
    pub tool_manager: Arc<RecordingCapabilityManager<ToolReference>>,
    /// Tool catalog.
    pub tools: ToolCatalog,
    /// Resource exposure recorder.
    pub resource_manager: Arc<RecordingCapabilityManager<ResourceReference>>,
    /// Resource catalog.
    pub resources: ResourceCatalog,
}

impl Gateway {
    /// Registers a backend through discovery.
    pub async fn register_backend(
        &self,
        name: &str,
        host: &str,
        service_type: ServiceType,
    ) -> ServiceTarget {
        let backend = target(name, host, service_type, &self.clock);
        self.discovery
            .register(&backend)
            .await
            .expect("backend registration should succeed");
        backend
    }
}

/// Provides a fresh gateway for each test.
#[fixture]
pub fn gateway() -> Gateway {
    init_tracing();
    let clock = FixedClock::default();
    let publisher = EventPublisher::default();
    let tool_calls = ToolCallPublisher::default().with_clock(Arc::new(clock.clone()));
    let config = RouterConfig::default();
    let registry = Arc::new(InMemoryServiceRegistry::with_max_state_count(
        config.registry.max_state_count,
    ));
    let transport = Arc::new(InMemoryTransport::new());
    let shared_clock = Arc::new(clock.clone());
    let tool_repository = Arc::new(InMemoryCapabilityRepository::new());
    let tool_manager = Arc::new(RecordingCapabilityManager::new());
    let resource_manager = Arc::new(RecordingCapabilityManager::new());
    Gateway {
        discovery: DiscoveryService::new(
            Arc::clone(&registry),
            publisher.clone(),
            Arc::clone(&shared_clock),
        ),
        cleanup: StaleCleanupService::new(Arc::clone(&registry), publisher.clone(), shared_clock),
        bridges: Bridges::new(
            Arc::new(ServiceResolver::new(Arc::clone(&registry))),
            Arc::clone(&transport),
        )
        .with_tool_call_events(tool_calls.clone()),
        tools: CapabilityCatalog::new(Arc::clone(&tool_repository), Arc::clone(&tool_manager)),
        resources: CapabilityCatalog::new(
            Arc::new(InMemoryCapabilityRepository::new()),
            Arc::clone(&resource_manager),
        ),
        tool_repository,
        tool_manager,
        resource_manager,
        config,
        clock,
        publisher,
        tool_calls,
        registry,
        transport,
    }
}
