//! Bridges keyed by capability kind.

use super::{CodeExecutorBridge, ResourceBridge, ToolsBridge};
use crate::bridge::ports::BridgeTransport;
use crate::events::ToolCallPublisher;
use crate::service_registry::{
    domain::ServiceType,
    ports::ServiceRegistry,
    services::{FirstRegistered, SelectionPolicy, ServiceResolver},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kinds of capability routed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityKind {
    /// Tool invocation.
    Tool,
    /// Resource acquisition.
    Resource,
    /// Code execution.
    CodeExecution,
}

impl CapabilityKind {
    /// Every kind, in routing order.
    pub const ALL: [Self; 3] = [Self::Tool, Self::Resource, Self::CodeExecution];

    /// Returns the kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Resource => "resource",
            Self::CodeExecution => "code-execution",
        }
    }

    /// Returns the backend service type serving this kind.
    #[must_use]
    pub const fn service_type(self) -> ServiceType {
        match self {
            Self::Tool => ServiceType::ToolInvoker,
            Self::Resource => ServiceType::ResourceProvider,
            Self::CodeExecution => ServiceType::CodeExecutionEngine,
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A borrowed bridge of one kind.
pub enum Bridge<'a, R, T, P = FirstRegistered>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// The tools bridge.
    Tool(&'a ToolsBridge<R, T, P>),
    /// The resource bridge.
    Resource(&'a ResourceBridge<R, T, P>),
    /// The code execution bridge.
    CodeExecution(&'a CodeExecutorBridge<R, T, P>),
}

impl<R, T, P> Bridge<'_, R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// Returns the kind of this bridge.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Self::Tool(_) => CapabilityKind::Tool,
            Self::Resource(_) => CapabilityKind::Resource,
            Self::CodeExecution(_) => CapabilityKind::CodeExecution,
        }
    }
}

/// One bridge per capability kind, sharing a resolver and a transport.
pub struct Bridges<R, T, P = FirstRegistered>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    tools: ToolsBridge<R, T, P>,
    resources: ResourceBridge<R, T, P>,
    code_execution: CodeExecutorBridge<R, T, P>,
}

impl<R, T, P> Bridges<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// Builds every bridge over `resolver` and `transport`.
    #[must_use]
    pub fn new(resolver: Arc<ServiceResolver<R, P>>, transport: Arc<T>) -> Self {
        Self {
            tools: ToolsBridge::new(Arc::clone(&resolver), Arc::clone(&transport)),
            resources: ResourceBridge::new(Arc::clone(&resolver), Arc::clone(&transport)),
            code_execution: CodeExecutorBridge::new(resolver, transport),
        }
    }

    /// Publishes tool call events from the tools bridge through `events`.
    #[must_use]
    pub fn with_tool_call_events(mut self, events: ToolCallPublisher) -> Self {
        self.tools = self.tools.with_tool_call_events(events);
        self
    }

    /// Returns the tools bridge.
    #[must_use]
    pub const fn tools(&self) -> &ToolsBridge<R, T, P> {
        &self.tools
    }

    /// Returns the resource bridge.
    #[must_use]
    pub const fn resources(&self) -> &ResourceBridge<R, T, P> {
        &self.resources
    }

    /// Returns the code execution bridge.
    #[must_use]
    pub const fn code_execution(&self) -> &CodeExecutorBridge<R, T, P> {
        &self.code_execution
    }

    /// Returns the bridge serving `kind`.
    #[must_use]
    pub const fn get(&self, kind: CapabilityKind) -> Bridge<'_, R, T, P> {
        match kind {
            CapabilityKind::Tool => Bridge::Tool(&self.tools),
            CapabilityKind::Resource => Bridge::Resource(&self.resources),
            CapabilityKind::CodeExecution => Bridge::CodeExecution(&self.code_execution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::adapters::memory::InMemoryTransport;
    use crate::service_registry::adapters::memory::InMemoryServiceRegistry;
    use rstest::rstest;

    #[rstest]
    #[case(CapabilityKind::Tool, ServiceType::ToolInvoker)]
    #[case(CapabilityKind::Resource, ServiceType::ResourceProvider)]
    #[case(CapabilityKind::CodeExecution, ServiceType::CodeExecutionEngine)]
    fn kinds_map_to_service_types(#[case] kind: CapabilityKind, #[case] expected: ServiceType) {
        assert_eq!(kind.service_type(), expected);
    }

    #[test]
    fn every_kind_has_a_bridge() {
        let bridges: Bridges<InMemoryServiceRegistry, InMemoryTransport> = Bridges::new(
            Arc::new(ServiceResolver::new(Arc::new(InMemoryServiceRegistry::new()))),
            Arc::new(InMemoryTransport::new()),
        );

        for kind in CapabilityKind::ALL {
            assert_eq!(bridges.get(kind).kind(), kind);
        }
    }
}
