//! Port contracts for reaching backend services.

mod transport;

#[cfg(test)]
pub use transport::MockBridgeTransport;
pub use transport::{BridgeTransport, CodeExecutionReplies, TransportError, TransportResult};
