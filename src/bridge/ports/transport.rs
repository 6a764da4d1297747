//! Transport port used by every bridge.

use crate::bridge::domain::{
    CodeExecutionReply, CodeExecutionRequest, ProvisionReply, ProvisionRequest, ResourceReply,
    ResourceRequest, ToolInvokeReply, ToolInvokeRequest,
};
use crate::service_registry::domain::ServiceTarget;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Replies of one code execution, in emission order.
///
/// Dropping the stream cancels the execution and releases the connection.
pub type CodeExecutionReplies = BoxStream<'static, TransportResult<CodeExecutionReply>>;

/// Carries bridge requests to a resolved backend.
///
/// Exactly one implementation is in use at a time, chosen by deployment
/// configuration. Failures are terminal for the call; implementations do
/// not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BridgeTransport: Send + Sync {
    /// Ships configuration and secrets to `target`.
    async fn provision(
        &self,
        request: &ProvisionRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ProvisionReply>;

    /// Invokes a tool on `target`.
    async fn invoke_tool(
        &self,
        request: &ToolInvokeRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ToolInvokeReply>;

    /// Acquires a resource from `target`.
    async fn acquire_resource(
        &self,
        request: &ResourceRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ResourceReply>;

    /// Starts a code execution on `target` and streams its replies.
    async fn execute_code(
        &self,
        request: &CodeExecutionRequest,
        target: &ServiceTarget,
    ) -> TransportResult<CodeExecutionReplies>;
}

/// Transport-level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The backend could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The call exceeded its deadline.
    #[error("deadline of {seconds}s exceeded")]
    DeadlineExceeded {
        /// Deadline in seconds.
        seconds: u64,
    },

    /// The backend answered with something other than a valid reply.
    #[error("protocol error: {0}")]
    Protocol(String),
}
