//! Routing tool calls to tool-invoker backends.

use super::ProvisioningService;
use crate::bridge::{
    domain::{
        BridgeError, BridgeResult, ToolArguments, ToolInvokeReply, ToolInvokeRequest,
        ToolResponse,
    },
    ports::{BridgeTransport, TransportError},
};
use crate::capability::{
    domain::{
        BODY_PROPERTY, CallableReference, ProvisioningReference, Property, ToolPayload,
        ToolReference,
    },
    ports::{PayloadProvisioner, ProvisionerError},
};
use crate::events::{ToolCallErrorCategory, ToolCallEvent, ToolCallPublisher};
use crate::service_registry::{
    domain::{ServiceTarget, ServiceType},
    ports::ServiceRegistry,
    services::{FirstRegistered, SelectionPolicy, ServiceResolver},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Fallback text when an error reply carries no content.
const TOOL_ERROR_FALLBACK: &str = "tool execution error";

/// Resolves the backend serving a tool type.
///
/// Tool invokers are preferred; code-execution engines of the same name may
/// also serve tools.
async fn resolve_tool_target<R, P>(
    resolver: &ServiceResolver<R, P>,
    tool_type: &str,
) -> BridgeResult<ServiceTarget>
where
    R: ServiceRegistry,
    P: SelectionPolicy,
{
    if let Some(target) = resolver.resolve(tool_type, ServiceType::ToolInvoker).await? {
        return Ok(target);
    }
    resolver
        .resolve(tool_type, ServiceType::CodeExecutionEngine)
        .await?
        .ok_or_else(|| BridgeError::NotFound {
            capability: tool_type.to_owned(),
            service_type: ServiceType::ToolInvoker,
        })
}

fn header_value(key: &str, property: &Property, arguments: &ToolArguments) -> BridgeResult<String> {
    match (property.value.as_deref(), arguments.text(key)) {
        (None, Some(supplied)) => Ok(supplied),
        (None, None) => {
            error!(key, "malformed value: neither a default value nor an argument were provided");
            Err(BridgeError::MalformedRequest {
                key: key.to_owned(),
            })
        }
        (Some(_), Some(supplied)) => {
            warn!(key, "overriding default value with the one provided by the caller");
            Ok(supplied)
        }
        (Some(default), None) => Ok(default.to_owned()),
    }
}

fn service_headers(
    tool: &ToolReference,
    arguments: &ToolArguments,
) -> BridgeResult<BTreeMap<String, String>> {
    tool.input_schema()
        .service_headers()
        .map(|(key, property)| {
            header_value(key, property, arguments).map(|value| (key.to_owned(), value))
        })
        .collect()
}

fn body(tool: &ToolReference, arguments: &ToolArguments) -> String {
    if tool.input_schema().declares_body() {
        arguments.text(BODY_PROPERTY).unwrap_or_default()
    } else {
        String::new()
    }
}

/// Builds the invoke request for a tool call.
///
/// # Errors
///
/// Returns [`BridgeError::MalformedRequest`] naming the first service header
/// that has neither a default nor a caller-supplied value.
pub fn build_invoke_request(
    tool: &ToolReference,
    arguments: &ToolArguments,
) -> BridgeResult<ToolInvokeRequest> {
    Ok(ToolInvokeRequest {
        uri: tool.uri().to_owned(),
        body: body(tool, arguments),
        configuration_uri: tool.configuration_uri().unwrap_or_default().to_owned(),
        secrets_uri: tool.secrets_uri().unwrap_or_default().to_owned(),
        headers: service_headers(tool, arguments)?,
        arguments: arguments.to_text_map(),
    })
}

fn transport_category(error: &TransportError) -> ToolCallErrorCategory {
    match error {
        TransportError::Connect(_) | TransportError::DeadlineExceeded { .. } => {
            ToolCallErrorCategory::ServiceUnavailable
        }
        TransportError::Protocol(message) => ToolCallErrorCategory::of_protocol_error(message),
    }
}

fn reply_event(
    call_id: Uuid,
    events: &ToolCallPublisher,
    reply: &ToolInvokeReply,
    elapsed: Duration,
) -> ToolCallEvent {
    if reply.is_error {
        let message = reply
            .content
            .first()
            .map_or(TOOL_ERROR_FALLBACK, String::as_str);
        return ToolCallEvent::failed(
            call_id,
            events.now(),
            ToolCallErrorCategory::of_reply(message),
            message.to_owned(),
            elapsed,
        );
    }
    ToolCallEvent::completed(call_id, events.now(), reply.content.join("\n"), elapsed)
}

fn into_response(reply: ToolInvokeReply) -> ToolResponse {
    if reply.is_error {
        let message = reply
            .content
            .into_iter()
            .next()
            .unwrap_or_else(|| TOOL_ERROR_FALLBACK.to_owned());
        return ToolResponse::error(message);
    }
    ToolResponse::success(reply.content)
}

/// Executes tool calls against resolved backends.
pub struct ToolExecutor<R, T, P = FirstRegistered>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    resolver: Arc<ServiceResolver<R, P>>,
    transport: Arc<T>,
    events: ToolCallPublisher,
}

impl<R, T, P> Clone for ToolExecutor<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            transport: Arc::clone(&self.transport),
            events: self.events.clone(),
        }
    }
}

impl<R, T, P> ToolExecutor<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// Executes a tool call, surfacing routing failures as errors.
    ///
    /// A reply flagged as an error is returned as an error-flagged
    /// [`ToolResponse`], not as an `Err`. Once the backend is resolved and
    /// the request built, a `started` event is published, followed by
    /// `completed` or `failed`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no backend serves the tool
    /// type, [`BridgeError::MalformedRequest`] for a missing header value,
    /// or [`BridgeError::Unavailable`] when the transport fails.
    pub async fn try_execute(
        &self,
        arguments: &ToolArguments,
        tool: &ToolReference,
    ) -> BridgeResult<ToolResponse> {
        let target = resolve_tool_target(&self.resolver, tool.capability_type()).await?;
        let request = build_invoke_request(tool, arguments)?;
        let started = ToolCallEvent::started(self.events.now(), tool, &target, &request);
        let call_id = started.event_id;
        self.events.publish(started);
        info!(
            tool = tool.name(),
            tool_type = tool.capability_type(),
            address = %target.address(),
            "invoking tool"
        );

        let started_at = Instant::now();
        match self.transport.invoke_tool(&request, &target).await {
            Ok(reply) => {
                let event = reply_event(call_id, &self.events, &reply, started_at.elapsed());
                self.events.publish(event);
                Ok(into_response(reply))
            }
            Err(source) => {
                self.events.publish(ToolCallEvent::failed(
                    call_id,
                    self.events.now(),
                    transport_category(&source),
                    source.to_string(),
                    started_at.elapsed(),
                ));
                Err(BridgeError::Unavailable {
                    address: target.address(),
                    source,
                })
            }
        }
    }

    /// Executes a tool call, turning every failure into an error-flagged
    /// response.
    pub async fn execute(&self, arguments: &ToolArguments, tool: &ToolReference) -> ToolResponse {
        match self.try_execute(arguments, tool).await {
            Ok(response) => response,
            Err(err) => {
                error!(tool = tool.name(), kind = %err.kind(), error = %err, "tool call failed");
                err.into_tool_response()
            }
        }
    }
}

/// Bridge for tools: provisioning plus execution.
pub struct ToolsBridge<R, T, P = FirstRegistered>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    executor: ToolExecutor<R, T, P>,
    provisioning: ProvisioningService<T>,
}

impl<R, T, P> ToolsBridge<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    /// Creates a tools bridge.
    #[must_use]
    pub fn new(resolver: Arc<ServiceResolver<R, P>>, transport: Arc<T>) -> Self {
        Self {
            provisioning: ProvisioningService::new(Arc::clone(&transport)),
            executor: ToolExecutor {
                resolver,
                transport,
                events: ToolCallPublisher::default(),
            },
        }
    }

    /// Publishes tool call events through `events`.
    #[must_use]
    pub fn with_tool_call_events(mut self, events: ToolCallPublisher) -> Self {
        self.executor.events = events;
        self
    }

    /// Returns the publisher of tool call events.
    #[must_use]
    pub const fn tool_call_events(&self) -> &ToolCallPublisher {
        &self.executor.events
    }

    /// Returns an executor sharing this bridge's resolver and transport.
    #[must_use]
    pub fn executor(&self) -> ToolExecutor<R, T, P> {
        self.executor.clone()
    }

    /// Provisions the backend serving a tool payload.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when no backend serves the tool
    /// type or [`BridgeError::Unavailable`] when provisioning fails.
    pub async fn provision(&self, payload: &ToolPayload) -> BridgeResult<ProvisioningReference> {
        let tool = payload.payload();
        let target = resolve_tool_target(&self.executor.resolver, tool.capability_type()).await?;
        self.provisioning
            .provision(
                tool.name(),
                payload.configuration_data(),
                payload.secrets_data(),
                &target,
            )
            .await
    }
}

#[async_trait]
impl<R, T, P> PayloadProvisioner<ToolReference> for ToolsBridge<R, T, P>
where
    R: ServiceRegistry,
    T: BridgeTransport,
    P: SelectionPolicy,
{
    async fn provision(
        &self,
        payload: &ToolPayload,
    ) -> Result<ProvisioningReference, ProvisionerError> {
        Self::provision(self, payload).await.map_err(ProvisionerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::adapters::memory::{InMemoryTransport, RecordedRequest};
    use crate::bridge::ports::{MockBridgeTransport, TransportError};
    use crate::capability::domain::{InputSchema, Property};
    use crate::error::ErrorKind;
    use crate::events::ToolCallStage;
    use crate::service_registry::adapters::memory::InMemoryServiceRegistry;
    use crate::test_support::FixedClock;
    use mockable::Clock;
    use rstest::{fixture, rstest};

    struct Harness {
        registry: Arc<InMemoryServiceRegistry>,
        resolver: Arc<ServiceResolver<InMemoryServiceRegistry>>,
        clock: FixedClock,
    }

    impl Harness {
        async fn register(
            &self,
            name: &str,
            service_type: ServiceType,
            host: &str,
        ) -> ServiceTarget {
            let target = ServiceTarget::new(name, host, 9190, service_type, &self.clock)
                .expect("valid target");
            self.registry.register(&target).await.expect("register");
            target
        }
    }

    #[fixture]
    fn harness() -> Harness {
        let registry = Arc::new(InMemoryServiceRegistry::new());
        Harness {
            resolver: Arc::new(ServiceResolver::new(Arc::clone(&registry))),
            registry,
            clock: FixedClock::default(),
        }
    }

    fn keyed_tool(default: Option<&str>) -> ToolReference {
        let header = Property::new("string", "api key").as_service_header();
        let property = match default {
            Some(value) => header.with_default(value),
            None => header,
        };
        ToolReference::new("weather", "http://api/forecast", "http")
            .expect("valid tool")
            .with_input_schema(
                InputSchema::default()
                    .with_property("X", property)
                    .with_property(BODY_PROPERTY, Property::new("string", "payload")),
            )
    }

    fn invoked(transport: &InMemoryTransport) -> ToolInvokeRequest {
        transport
            .requests()
            .into_iter()
            .find_map(|request| match request {
                RecordedRequest::InvokeTool(_, invoke) => Some(invoke),
                _ => None,
            })
            .expect("tool was invoked")
    }

    #[rstest]
    #[case(None, Some("1"), "1")]
    #[case(Some("default"), Some("caller"), "caller")]
    #[case(Some("default"), None, "default")]
    #[tokio::test(flavor = "multi_thread")]
    async fn header_values_follow_resolution_order(
        harness: Harness,
        #[case] default: Option<&str>,
        #[case] supplied: Option<&str>,
        #[case] expected: &str,
    ) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let transport = Arc::new(InMemoryTransport::new());
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::clone(&transport));
        let arguments = match supplied {
            Some(value) => ToolArguments::new().with("X", value),
            None => ToolArguments::new(),
        };

        bridge
            .executor()
            .try_execute(&arguments, &keyed_tool(default))
            .await
            .expect("call routed");

        let request = invoked(&transport);
        assert_eq!(request.headers.get("X").map(String::as_str), Some(expected));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_header_without_default_is_malformed(harness: Harness) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let bridge = ToolsBridge::new(
            Arc::clone(&harness.resolver),
            Arc::new(InMemoryTransport::new()),
        );

        let err = bridge
            .executor()
            .try_execute(&ToolArguments::new(), &keyed_tool(None))
            .await
            .expect_err("header missing");

        assert_eq!(err.kind(), ErrorKind::MalformedRequest);
        assert!(err.to_string().contains("key X"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn body_and_arguments_are_forwarded(harness: Harness) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let transport = Arc::new(InMemoryTransport::new());
        transport.script_tool_reply(
            "http://api/forecast",
            ToolInvokeReply {
                is_error: false,
                content: vec!["sunny".to_owned(), "22C".to_owned()],
            },
        );
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::clone(&transport));
        let arguments = ToolArguments::new()
            .with("X", "k")
            .with(BODY_PROPERTY, "{\"city\":\"Porto\"}")
            .with("days", 2);

        let response = bridge.executor().execute(&arguments, &keyed_tool(None)).await;

        assert!(!response.is_error());
        assert_eq!(response.content(), ["sunny".to_owned(), "22C".to_owned()]);
        let request = invoked(&transport);
        assert_eq!(request.body, "{\"city\":\"Porto\"}");
        assert_eq!(request.arguments.get("days").map(String::as_str), Some("2"));
        assert_eq!(request.configuration_uri, "");
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn code_engine_serves_tools_when_no_invoker_exists(harness: Harness) {
        harness
            .register("http", ServiceType::CodeExecutionEngine, "engine")
            .await;
        let transport = Arc::new(InMemoryTransport::new());
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::clone(&transport));

        bridge
            .executor()
            .try_execute(&ToolArguments::new().with("X", "k"), &keyed_tool(None))
            .await
            .expect("call routed");

        assert!(matches!(
            transport.requests().first(),
            Some(RecordedRequest::InvokeTool(address, _)) if address == "engine:9190"
        ));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unresolved_tool_type_is_an_error_response(harness: Harness) {
        let bridge = ToolsBridge::new(
            Arc::clone(&harness.resolver),
            Arc::new(InMemoryTransport::new()),
        );

        let response = bridge
            .executor()
            .execute(&ToolArguments::new(), &keyed_tool(Some("d")))
            .await;

        assert!(response.is_error());
        assert!(response.content().iter().any(|line| line.contains("http")));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn error_reply_maps_to_first_content_item(harness: Harness) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let mut transport = MockBridgeTransport::new();
        transport.expect_invoke_tool().times(1).returning(|_, _| {
            Ok(ToolInvokeReply {
                is_error: true,
                content: vec!["quota exceeded".to_owned(), "ignored".to_owned()],
            })
        });
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::new(transport));

        let response = bridge
            .executor()
            .try_execute(&ToolArguments::new(), &keyed_tool(Some("d")))
            .await
            .expect("reply is not an Err");

        assert_eq!(response, ToolResponse::error("quota exceeded"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn transport_failure_is_unavailable(harness: Harness) {
        harness.register("http", ServiceType::ToolInvoker, "10.1.1.1").await;
        let mut transport = MockBridgeTransport::new();
        transport
            .expect_invoke_tool()
            .withf(|request, target| {
                request.uri == "http://api/forecast" && target.address() == "10.1.1.1:9190"
            })
            .returning(|_, _| Err(TransportError::Connect("refused".to_owned())));
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::new(transport));

        let err = bridge
            .executor()
            .try_execute(&ToolArguments::new(), &keyed_tool(Some("d")))
            .await
            .expect_err("transport fails");

        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn provisioning_resolves_the_tool_backend(harness: Harness) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let transport = Arc::new(InMemoryTransport::new());
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::clone(&transport));
        let payload = ToolPayload::new(keyed_tool(None)).with_configuration("units=metric");

        let reference = bridge.provision(&payload).await.expect("provisioned");

        assert_eq!(
            transport.read_uri(reference.configuration_uri()).as_deref(),
            Some("units=metric")
        );
    }

    fn drain(
        receiver: &mut tokio::sync::broadcast::Receiver<ToolCallEvent>,
    ) -> Vec<ToolCallEvent> {
        std::iter::from_fn(|| receiver.try_recv().ok()).collect()
    }

    fn stages(events: &[ToolCallEvent]) -> Vec<ToolCallStage> {
        events.iter().map(|event| event.stage).collect()
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn successful_call_emits_started_then_completed(harness: Harness) {
        let target = harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let transport = Arc::new(InMemoryTransport::new());
        transport.script_tool_reply(
            "http://api/forecast",
            ToolInvokeReply {
                is_error: false,
                content: vec!["sunny".to_owned(), "22C".to_owned()],
            },
        );
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), transport)
            .with_tool_call_events(
                ToolCallPublisher::default().with_clock(Arc::new(harness.clock.clone())),
            );
        let mut receiver = bridge.tool_call_events().subscribe();

        bridge
            .executor()
            .try_execute(&ToolArguments::new().with("X", "secret-key"), &keyed_tool(None))
            .await
            .expect("call routed");

        let events = drain(&mut receiver);
        assert_eq!(stages(&events), [ToolCallStage::Started, ToolCallStage::Completed]);
        let [started, completed] = events.as_slice() else {
            panic!("expected two events, got {events:?}");
        };
        assert_eq!(started.tool_name.as_deref(), Some("weather"));
        let expected_id = target.id().to_string();
        assert_eq!(started.service_id.as_deref(), Some(expected_id.as_str()));
        assert_eq!(started.timestamp, harness.clock.utc());
        assert_eq!(completed.event_id, started.event_id);
        assert_eq!(completed.content.as_deref(), Some("sunny\n22C"));
        assert_eq!(completed.error_category, ToolCallErrorCategory::None);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn error_reply_emits_failed_with_reply_category(harness: Harness) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let mut transport = MockBridgeTransport::new();
        transport.expect_invoke_tool().returning(|_, _| {
            Ok(ToolInvokeReply {
                is_error: true,
                content: vec!["missing required argument: city".to_owned()],
            })
        });
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::new(transport));
        let mut receiver = bridge.tool_call_events().subscribe();

        let response = bridge
            .executor()
            .execute(&ToolArguments::new(), &keyed_tool(Some("d")))
            .await;

        assert!(response.is_error());
        let events = drain(&mut receiver);
        assert_eq!(stages(&events), [ToolCallStage::Started, ToolCallStage::Failed]);
        let [started, failed] = events.as_slice() else {
            panic!("expected two events, got {events:?}");
        };
        assert_eq!(failed.event_id, started.event_id);
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(failed.error_category, ToolCallErrorCategory::InvalidArguments);
        assert_eq!(
            failed.error_message.as_deref(),
            Some("missing required argument: city")
        );
    }

    #[rstest]
    #[case(
        TransportError::Connect("refused".to_owned()),
        ToolCallErrorCategory::ServiceUnavailable
    )]
    #[case(
        TransportError::DeadlineExceeded { seconds: 20 },
        ToolCallErrorCategory::ServiceUnavailable
    )]
    #[case(
        TransportError::Protocol("garbled reply".to_owned()),
        ToolCallErrorCategory::Unknown
    )]
    #[tokio::test(flavor = "multi_thread")]
    async fn transport_failure_emits_failed_with_transport_category(
        harness: Harness,
        #[case] failure: TransportError,
        #[case] expected: ToolCallErrorCategory,
    ) {
        harness.register("http", ServiceType::ToolInvoker, "localhost").await;
        let mut transport = MockBridgeTransport::new();
        let message = failure.to_string();
        transport
            .expect_invoke_tool()
            .returning(move |_, _| Err(failure.clone()));
        let bridge = ToolsBridge::new(Arc::clone(&harness.resolver), Arc::new(transport));
        let mut receiver = bridge.tool_call_events().subscribe();

        let result = bridge
            .executor()
            .try_execute(&ToolArguments::new(), &keyed_tool(Some("d")))
            .await;

        assert!(result.is_err());
        let events = drain(&mut receiver);
        assert_eq!(stages(&events), [ToolCallStage::Started, ToolCallStage::Failed]);
        let [_, failed] = events.as_slice() else {
            panic!("expected two events, got {events:?}");
        };
        assert_eq!(failed.error_category, expected);
        assert_eq!(failed.error_message.as_deref(), Some(message.as_str()));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unrouted_call_emits_no_events(harness: Harness) {
        let bridge = ToolsBridge::new(
            Arc::clone(&harness.resolver),
            Arc::new(InMemoryTransport::new()),
        );
        let mut receiver = bridge.tool_call_events().subscribe();

        let response = bridge
            .executor()
            .execute(&ToolArguments::new(), &keyed_tool(Some("d")))
            .await;

        assert!(response.is_error());
        assert!(drain(&mut receiver).is_empty());
    }
}
