//! Registration, resolution and liveness of backend instances.
//!
//! Backends register as [`domain::ServiceTarget`]s, report liveness through
//! pings and probes, and are resolved per capability request. Stale
//! registrations are swept by age. The module follows the same hexagonal
//! split as the rest of the crate:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
