//! Error types for service registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing service registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceRegistryDomainError {
    /// The service name is empty after trimming.
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// The host is empty after trimming.
    #[error("service host must not be empty")]
    EmptyHost,

    /// Port zero cannot be dialled.
    #[error("service port must be greater than zero")]
    InvalidPort,
}

/// Error returned while parsing a service type from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown service type: {0}")]
pub struct ParseServiceTypeError(pub String);

/// Error returned while parsing a health status from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown health status: {0}")]
pub struct ParseHealthStatusError(pub String);
