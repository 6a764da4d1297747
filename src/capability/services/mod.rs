//! Application services for exposed capabilities.

mod catalog;
mod error;
mod labels;

pub use catalog::CapabilityCatalog;
pub use error::{CatalogServiceError, CatalogServiceResult};
pub use labels::{BatchOutcome, LabelMutationService};
