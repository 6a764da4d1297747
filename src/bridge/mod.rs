//! Bridges from agent-facing capability calls to backend services.
//!
//! Each call resolves a live backend through the service registry and is
//! forwarded over a [`ports::BridgeTransport`]. Routing failures surface as
//! [`domain::BridgeError`]; replies flagged as errors by the backend are
//! returned as data.
//!
//! - **Domain** (`domain`): wire messages, agent-facing responses and error
//!   mapping.
//! - **Ports** (`ports`): the transport contract.
//! - **Adapters** (`adapters`): HTTP and in-memory transports.
//! - **Services** (`services`): provisioning plus the tools, resource and
//!   code execution bridges.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
