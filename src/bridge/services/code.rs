//! Streaming code execution on code-execution engines.

use crate::bridge::{
    domain::{
        BridgeError, BridgeResult, CodeExecutionReply, CodeExecutionRequest, CodeExecutionTask,
    },
    ports::{BridgeTransport, CodeExecutionReplies, TransportResult},
};
use crate::service_registry::{
    domain::ServiceType,
    ports::ServiceRegistry,
    services::{FirstRegistered, SelectionPolicy, ServiceResolver},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};

/// URI scheme of code execution requests.
pub const CODE_EXECUTION_SCHEME: &str = "code-execution-engine";

/// Decodes base64 code, falling back to the raw text when it is not valid
/// base64 or not valid UTF-8.
#[must_use]
pub fn decode_code(encoded: &str) -> String {
    if encoded.is_empty() {
        return String::new();
    }
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|err| err.to_string())
        .and_then(|bytes| String::from_utf8(bytes).map_err(|err| err.to_string()));
    decoded.unwrap_or_else(|reason| {
        warn!(%reason, "failed to decode base64 code; using raw value");
        encoded.to_owned()
    })
}

/// Builds the transport request for a task.
#[must_use]
pub fn build_execution_request(
    engine_type: &str,
    language: &str,
    task: &CodeExecutionTask,
) -> CodeExecutionRequest {
    CodeExecutionRequest {
        uri: format!("{CODE_EXECUTION_SCHEME}://{engine_type}/{language}"),
        code: decode_code(&task.code),
        timeout: task.timeout,
        arguments: task
            .arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| (format!("arg{index}"), argument.clone()))
            .collect(),
        environment: task.environment.clone(),
    }
}

/// Replies of one execution in emission order.
///
/// The stream ends after a terminal status or a transport error. Dropping it
/// cancels the execution.
pub struct CodeExecutionStream {
    replies: CodeExecutionReplies,
    address: String,
    finished: bool,
}

impl CodeExecutionStream {
    /// Returns the address of the engine running the code.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Stream for CodeExecutionStream {
    type Item = TransportResult<CodeExecutionReply>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        let polled = self.replies.poll_next_unpin(cx);
        let ends = match &polled {
            Poll::Ready(Some(Ok(reply))) => reply.status.is_terminal(),
            Poll::Ready(Some(Err(_)) | None) => true,
            Poll::Pending => false,
        };
        if ends {
            self.finished = true;
            debug!(address = %self.address, "code execution stream finished");
        }
        polled
    }
}

/// Bridge for code execution.
pub struct CodeExecutorBridge<R, T, P = FirstRegistered>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    resolver: Arc<ServiceResolver<R, P>>,
    transport: Arc<T>,
}

impl<R, T, P> CodeExecutorBridge<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// Creates a code executor bridge.
    #[must_use]
    pub const fn new(resolver: Arc<ServiceResolver<R, P>>, transport: Arc<T>) -> Self {
        Self {
            resolver,
            transport,
        }
    }

    /// Starts `task` on the engine registered for `engine_type` and
    /// `language`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no engine matches or
    /// [`BridgeError::Unavailable`] when the execution cannot be started.
    pub async fn execute_code(
        &self,
        engine_type: &str,
        language: &str,
        task: &CodeExecutionTask,
    ) -> BridgeResult<CodeExecutionStream> {
        info!(engine_type, language, "executing code");
        let target = self
            .resolver
            .resolve_code_execution(ServiceType::CodeExecutionEngine, engine_type, language)
            .await?
            .ok_or_else(|| BridgeError::NotFound {
                capability: format!("{engine_type}/{language}"),
                service_type: ServiceType::CodeExecutionEngine,
            })?;
        let address = target.address();
        let request = build_execution_request(engine_type, language, task);
        let replies = self
            .transport
            .execute_code(&request, &target)
            .await
            .map_err(|source| BridgeError::Unavailable {
                address: address.clone(),
                source,
            })?;
        Ok(CodeExecutionStream {
            replies,
            address,
            finished: false,
        })
    }
}
