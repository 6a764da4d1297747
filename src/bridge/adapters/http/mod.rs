//! JSON-over-HTTP bridge transport.
//!
//! Each backend serves `POST http://{host}:{port}/{endpoint}` with a JSON
//! body. Code execution answers with newline-delimited JSON replies.

mod ndjson;

pub use ndjson::decode_ndjson;

use crate::bridge::{
    domain::{
        CodeExecutionRequest, ProvisionReply, ProvisionRequest, ResourceReply, ResourceRequest,
        ToolInvokeReply, ToolInvokeRequest,
    },
    ports::{BridgeTransport, CodeExecutionReplies, TransportError, TransportResult},
};
use crate::service_registry::domain::ServiceTarget;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default per-call deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

const PROVISION_ENDPOINT: &str = "provision";
const INVOKE_ENDPOINT: &str = "tools/invoke";
const ACQUIRE_ENDPOINT: &str = "resources/acquire";
const EXECUTE_ENDPOINT: &str = "code/execute";

/// Bridge transport over HTTP with a per-call deadline.
///
/// Code execution gets twice the deadline. Dropping a reply stream drops the
/// response body and closes its connection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    deadline: Duration,
}

impl HttpTransport {
    /// Creates a transport using `deadline` for every call.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Protocol`] when the HTTP client cannot be
    /// built.
    pub fn new(deadline: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(deadline)
            .build()
            .map_err(|err| {
                TransportError::Protocol(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self { client, deadline })
    }

    /// Creates a transport over a preconfigured client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// Returns the per-call deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    const fn code_deadline(&self) -> Duration {
        self.deadline.saturating_mul(2)
    }

    async fn send<Q>(
        &self,
        target: &ServiceTarget,
        endpoint: &str,
        request: &Q,
        deadline: Duration,
    ) -> TransportResult<reqwest::Response>
    where
        Q: Serialize + Sync,
    {
        let url = endpoint_url(target, endpoint);
        debug!(%url, "sending bridge request");
        self.client
            .post(&url)
            .timeout(deadline)
            .json(request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| classify(&err, deadline))
    }

    async fn call<Q, P>(
        &self,
        target: &ServiceTarget,
        endpoint: &str,
        request: &Q,
    ) -> TransportResult<P>
    where
        Q: Serialize + Sync,
        P: DeserializeOwned,
    {
        self.send(target, endpoint, request, self.deadline)
            .await?
            .json::<P>()
            .await
            .map_err(|err| classify(&err, self.deadline))
    }
}

fn classify(err: &reqwest::Error, deadline: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::DeadlineExceeded {
            seconds: deadline.as_secs(),
        }
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Protocol(err.to_string())
    }
}

fn endpoint_url(target: &ServiceTarget, endpoint: &str) -> String {
    format!("http://{}/{endpoint}", target.address())
}

#[async_trait]
impl BridgeTransport for HttpTransport {
    async fn provision(
        &self,
        request: &ProvisionRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ProvisionReply> {
        self.call(target, PROVISION_ENDPOINT, request).await
    }

    async fn invoke_tool(
        &self,
        request: &ToolInvokeRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ToolInvokeReply> {
        self.call(target, INVOKE_ENDPOINT, request).await
    }

    async fn acquire_resource(
        &self,
        request: &ResourceRequest,
        target: &ServiceTarget,
    ) -> TransportResult<ResourceReply> {
        self.call(target, ACQUIRE_ENDPOINT, request).await
    }

    async fn execute_code(
        &self,
        request: &CodeExecutionRequest,
        target: &ServiceTarget,
    ) -> TransportResult<CodeExecutionReplies> {
        let response = self
            .send(target, EXECUTE_ENDPOINT, request, self.code_deadline())
            .await?;
        Ok(decode_ndjson(response.bytes_stream()))
    }
}
