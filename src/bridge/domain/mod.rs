//! Bridge messages, agent-facing responses and error mapping.

mod error;
mod messages;
mod protocol;

pub use error::{BridgeError, BridgeResult, ERROR_MIME_TYPE};
pub use messages::{
    CodeExecutionReply, CodeExecutionRequest, ExecutionStatus, NamedBlob, OutputType,
    ProvisionReply, ProvisionRequest, ResourceReply, ResourceRequest, ToolInvokeReply,
    ToolInvokeRequest,
};
pub use protocol::{
    CodeExecutionTask, ResourceArguments, ResourceContent, ToolArguments, ToolResponse,
};
