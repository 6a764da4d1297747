//! Port for the agent-facing protocol server's capability registration.

use crate::capability::domain::CallableReference;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for capability manager operations.
pub type CapabilityManagerResult<T> = Result<T, CapabilityManagerError>;

/// Registers exposed capabilities with the protocol server.
#[async_trait]
pub trait CapabilityManager<E: CallableReference>: Send + Sync {
    /// Announces a capability so agents can call it.
    async fn register(&self, capability: &E) -> CapabilityManagerResult<()>;

    /// Withdraws a capability by name.
    async fn unregister(&self, name: &str) -> CapabilityManagerResult<()>;
}

/// Errors raised by capability manager implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("capability manager rejected {name}: {reason}")]
pub struct CapabilityManagerError {
    /// Capability name.
    pub name: String,
    /// Rejection reason.
    pub reason: String,
}
