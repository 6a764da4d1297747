//! Capability router: a gateway routing agent capability calls to backends.
//!
//! Agents see tools, resources and code execution. Each call is resolved to
//! a live backend instance registered in the service registry, the backend
//! is provisioned with configuration and secrets, and the call is forwarded
//! over a pluggable transport.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, HTTP)
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`label_expression`]: Boolean label filters
//! - [`service_registry`]: Backend registration, resolution, health and
//!   stale cleanup
//! - [`capability`]: Tool and resource catalogs with label management
//! - [`bridge`]: Provisioning and routing of tool, resource and code calls
//! - [`events`]: Registry event publication and SSE framing
//! - [`config`]: Router configuration
//! - [`error`]: Error kinds shared by every service error

pub mod bridge;
pub mod capability;
pub mod config;
pub mod error;
pub mod events;
pub mod label_expression;
pub mod service_registry;

#[cfg(test)]
mod test_support;
