//! Exposed tools and resources and their catalog.
//!
//! A capability is announced to the agent-facing protocol server through the
//! [`ports::CapabilityManager`] port and stored through the
//! [`ports::CapabilityRepository`] port. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
