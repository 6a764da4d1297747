//! Port contracts for capability storage, exposure and provisioning.

mod manager;
mod provisioner;
mod repository;

pub use manager::{CapabilityManager, CapabilityManagerError, CapabilityManagerResult};
pub use provisioner::{PayloadProvisioner, ProvisionerError};
pub use repository::{CapabilityRepository, CapabilityRepositoryError, CapabilityRepositoryResult};
