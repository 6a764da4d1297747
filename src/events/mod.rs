//! Registry change events, tool call events and their server-push framing.

mod event;
mod publisher;
pub mod sse;
mod tool_call;

pub use event::{EventType, ParseEventTypeError, ServiceTargetEvent};
pub use publisher::{DEFAULT_EVENT_CAPACITY, EventPublisher, ToolCallPublisher};
pub use tool_call::{
    REDACTED, REDACTED_BODY, ToolCallErrorCategory, ToolCallEvent, ToolCallStage,
};
