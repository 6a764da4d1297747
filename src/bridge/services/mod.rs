//! Bridge services routing capability calls to resolved backends.

mod code;
mod provisioning;
mod registry;
mod resources;
mod tools;

pub use code::{
    CODE_EXECUTION_SCHEME, CodeExecutionStream, CodeExecutorBridge, build_execution_request,
    decode_code,
};
pub use provisioning::ProvisioningService;
pub use registry::{Bridge, Bridges, CapabilityKind};
pub use resources::ResourceBridge;
pub use tools::{ToolExecutor, ToolsBridge, build_invoke_request};
