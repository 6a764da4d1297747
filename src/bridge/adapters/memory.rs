//! Loopback transport for local runs and tests.

use crate::bridge::{
    domain::{
        CodeExecutionReply, CodeExecutionRequest, ProvisionReply, ProvisionRequest,
        ResourceReply, ResourceRequest, ToolInvokeReply, ToolInvokeRequest,
    },
    ports::{BridgeTransport, CodeExecutionReplies, TransportError, TransportResult},
};
use crate::service_registry::domain::ServiceTarget;
use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Scheme of URIs assigned to provisioned blobs.
pub const MEMORY_URI_SCHEME: &str = "mem";

/// A request received by [`InMemoryTransport`], with the target address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    /// A provisioning call.
    Provision(String, ProvisionRequest),
    /// A tool invocation.
    InvokeTool(String, ToolInvokeRequest),
    /// A resource acquisition.
    AcquireResource(String, ResourceRequest),
    /// A code execution.
    ExecuteCode(String, CodeExecutionRequest),
}

/// Answers bridge requests from in-process state.
///
/// Provisioned blobs are stored under `mem://` URIs readable through
/// [`InMemoryTransport::read_uri`]. Tool, resource and code replies are
/// scripted; every request is recorded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<RwLock<TransportState>>,
    open_executions: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct TransportState {
    blobs: BTreeMap<String, String>,
    next_blob: u64,
    reported_properties: BTreeMap<String, String>,
    tool_replies: BTreeMap<String, ToolInvokeReply>,
    resource_replies: BTreeMap<String, ResourceReply>,
    code_replies: Vec<CodeExecutionReply>,
    hold_executions_open: bool,
    unreachable: BTreeSet<String>,
    requests: Vec<RecordedRequest>,
}

struct OpenExecution(Arc<AtomicUsize>);

impl OpenExecution {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for OpenExecution {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryTransport {
    /// Creates a transport with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TransportResult<RwLockReadGuard<'_, TransportState>> {
        self.state
            .read()
            .map_err(|err| TransportError::Protocol(err.to_string()))
    }

    fn write(&self) -> TransportResult<RwLockWriteGuard<'_, TransportState>> {
        self.state
            .write()
            .map_err(|err| TransportError::Protocol(err.to_string()))
    }

    /// Returns the blob stored under a URI handed out by provisioning.
    #[must_use]
    pub fn read_uri(&self, uri: &str) -> Option<String> {
        self.read().ok()?.blobs.get(uri).cloned()
    }

    /// Sets the properties reported by every provisioning reply.
    pub fn report_properties(&self, properties: BTreeMap<String, String>) {
        if let Ok(mut state) = self.write() {
            state.reported_properties = properties;
        }
    }

    /// Scripts the reply for invocations of a tool URI.
    pub fn script_tool_reply(&self, uri: impl Into<String>, reply: ToolInvokeReply) {
        if let Ok(mut state) = self.write() {
            state.tool_replies.insert(uri.into(), reply);
        }
    }

    /// Scripts the reply for acquisitions of a resource location.
    pub fn script_resource_reply(&self, location: impl Into<String>, reply: ResourceReply) {
        if let Ok(mut state) = self.write() {
            state.resource_replies.insert(location.into(), reply);
        }
    }

    /// Scripts the replies streamed by every code execution.
    ///
    /// With `hold_open`, streams stay pending after the scripted replies
    /// until dropped.
    pub fn script_code_replies(&self, replies: Vec<CodeExecutionReply>, hold_open: bool) {
        if let Ok(mut state) = self.write() {
            state.code_replies = replies;
            state.hold_executions_open = hold_open;
        }
    }

    /// Makes every call to `address` fail to connect.
    pub fn set_unreachable(&self, address: impl Into<String>) {
        if let Ok(mut state) = self.write() {
            state.unreachable.insert(address.into());
        }
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.read()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Returns how many code execution streams are still alive.
    #[must_use]
    pub fn open_executions(&self) -> usize {
        self.open_executions.load(Ordering::SeqCst)
    }

    fn accept(
        &self,
        target: &ServiceTarget,
        request: RecordedRequest,
    ) -> TransportResult<RwLockWriteGuard<'_, TransportState>> {
        let address = target.address();
        let mut state = self.write()?;
        state.requests.push(request);
        if state.unreachable.contains(&address) {
            return Err(TransportError::Connect(format!("{address} refused the connection")));
        }
        Ok(state)
    }
}

fn store_blob(state: &mut TransportState, kind: &str, payload: &str) -> String {
    state.next_blob += 1;
    let uri = format!("{MEMORY_URI_SCHEME}://{kind}/{}", state.next_blob);
    state.blobs.insert(uri.clone(), payload.to_owned());
    uri
}

#[async_trait]
impl BridgeTransport for InMemoryTransport {
    async fn provision(
        &self,
        request: &ProvisionRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ProvisionReply> {
        let mut state = self.accept(
            target,
            RecordedRequest::Provision(target.address(), request.clone()),
        )?;
        let configuration_uri =
            store_blob(&mut state, "configurations", &request.configuration.payload);
        let secret_uri = store_blob(&mut state, "secrets", &request.secret.payload);
        Ok(ProvisionReply {
            configuration_uri,
            secret_uri,
            properties: state.reported_properties.clone(),
        })
    }

    async fn invoke_tool(
        &self,
        request: &ToolInvokeRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ToolInvokeReply> {
        let state = self.accept(
            target,
            RecordedRequest::InvokeTool(target.address(), request.clone()),
        )?;
        Ok(state
            .tool_replies
            .get(&request.uri)
            .cloned()
            .unwrap_or_else(|| ToolInvokeReply {
                is_error: true,
                content: vec![format!("no tool served at {}", request.uri)],
            }))
    }

    async fn acquire_resource(
        &self,
        request: &ResourceRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ResourceReply> {
        let state = self.accept(
            target,
            RecordedRequest::AcquireResource(target.address(), request.clone()),
        )?;
        Ok(state
            .resource_replies
            .get(&request.location)
            .cloned()
            .unwrap_or_else(|| ResourceReply {
                is_error: true,
                content: vec![format!("no resource at {}", request.location)],
            }))
    }

    async fn execute_code(
        &self,
        request: &CodeExecutionRequest,
        target: &ServiceTarget,
    ) -> TransportResult<CodeExecutionReplies> {
        let state = self.accept(
            target,
            RecordedRequest::ExecuteCode(target.address(), request.clone()),
        )?;
        let replies = state.code_replies.clone().into_iter();
        let hold_open = state.hold_executions_open;
        drop(state);

        let execution = OpenExecution::open(&self.open_executions);
        Ok(stream::unfold(
            (replies, execution),
            move |(mut remaining, execution)| async move {
                match remaining.next() {
                    Some(reply) => Some((Ok(reply), (remaining, execution))),
                    None if hold_open => futures::future::pending().await,
                    None => None,
                }
            },
        )
        .boxed())
    }
}
