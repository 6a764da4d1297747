//! In-memory adapters for the service registry ports.

mod probe;
mod registry;

pub use probe::StaticHealthProbe;
pub use registry::{DEFAULT_MAX_STATE_COUNT, InMemoryServiceRegistry};
