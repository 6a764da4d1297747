//! Port contracts for backend registration and liveness.

mod health;
mod repository;

pub use health::{HealthProbe, HealthProbeError};
pub use repository::{ServiceRegistry, ServiceRegistryError, ServiceRegistryResult};
