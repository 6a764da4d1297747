//! In-memory capability adapters.

mod manager;
mod repository;

pub use manager::RecordingCapabilityManager;
pub use repository::InMemoryCapabilityRepository;
