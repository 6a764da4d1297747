//! Domain model for backend registration and liveness.
//!
//! Backends register themselves as [`ServiceTarget`]s and report liveness
//! through pings and health probes, tracked per instance in an
//! [`ActivityRecord`]. Infrastructure concerns remain outside this boundary.

mod activity;
mod error;
mod ids;
mod target;

pub use activity::{ActivityRecord, HealthStatus, ServiceState};
pub use error::{ParseHealthStatusError, ParseServiceTypeError, ServiceRegistryDomainError};
pub use ids::ServiceTargetId;
pub use target::{LanguageDescriptor, ServiceTarget, ServiceType};
