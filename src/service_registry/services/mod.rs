//! Application services for backend discovery, resolution and liveness.

mod activity;
mod cleanup;
mod discovery;
mod error;
mod health;
mod listing;
mod resolver;

pub use activity::{
    ActivityService, ActivityStates, CapabilityStatus, FleetStatistics, MergedActivity,
    StatusCounts, classify, find_activity_record, merge_activity_states,
};
pub use cleanup::{
    CleanupOutcome, SECONDS_PER_DAY, ServiceMaxAge, StaleCapability, StaleCleanupService,
};
pub use discovery::DiscoveryService;
pub use error::{RegistryServiceError, RegistryServiceResult};
pub use health::{DEFAULT_PROBE_TIMEOUT, HealthCheckService, HealthSweepReport};
pub use listing::{CapabilityListing, CapabilitySummary, DEFAULT_LISTING_TIMEOUT};
pub use resolver::{FirstRegistered, SelectionPolicy, ServiceResolver};
