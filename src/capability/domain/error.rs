//! Error types for capability domain validation.

use thiserror::Error;

/// Errors returned while constructing capability domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityDomainError {
    /// The capability name is empty after trimming.
    #[error("capability name must not be empty")]
    EmptyName,

    /// The capability type, which names the serving backend, is empty.
    #[error("capability type must not be empty")]
    EmptyType,

    /// The tool URI or resource location is empty.
    #[error("capability address must not be empty")]
    EmptyAddress,

    /// A label key is empty after trimming.
    #[error("label keys must not be empty")]
    EmptyLabelKey,
}
