//! Tool registration, provisioning and invocation through the gateway.

use super::helpers::{Gateway, gateway};
use capability_router::{
    bridge::{
        adapters::memory::RecordedRequest,
        domain::{ToolArguments, ToolInvokeReply},
    },
    capability::{
        domain::{CallableReference, InputSchema, Property, ToolPayload, ToolReference},
        services::CatalogServiceError,
    },
    error::ErrorKind,
    events::{REDACTED, ToolCallStage},
    service_registry::domain::ServiceType,
};
use rstest::rstest;
use std::collections::BTreeMap;

fn forecast_tool() -> ToolReference {
    ToolReference::new("forecast", "http://weather.example/forecast", "weather-api")
        .expect("valid tool")
        .with_input_schema(
            InputSchema::default()
                .with_property("api-key", Property::new("string", "API key").as_service_header())
                .with_property("city", Property::new("string", "City name")),
        )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provisioned_tool_is_invoked_on_its_backend(gateway: Gateway) {
    gateway
        .register_backend("weather-api", "weather", ServiceType::ToolInvoker)
        .await;
    gateway.transport.report_properties(BTreeMap::from([(
        "units".to_owned(),
        "metric or imperial".to_owned(),
    )]));
    let payload = ToolPayload::new(forecast_tool())
        .with_configuration("endpoint: https://weather.example")
        .with_secrets("token: s3cret");

    let stored = gateway
        .tools
        .provision_and_add(payload, gateway.bridges.tools())
        .await
        .expect("provision and add should succeed");

    let configuration_uri = stored.configuration_uri().expect("configuration URI stamped");
    assert_eq!(
        gateway.transport.read_uri(configuration_uri).as_deref(),
        Some("endpoint: https://weather.example")
    );
    assert!(stored.input_schema().property("units").is_some());
    assert_eq!(gateway.tool_manager.registered_names(), vec!["forecast".to_owned()]);

    gateway.transport.script_tool_reply(
        "http://weather.example/forecast",
        ToolInvokeReply {
            is_error: false,
            content: vec!["sunny".to_owned()],
        },
    );
    let arguments = ToolArguments::new()
        .with("api-key", "k-123")
        .with("city", "Paris");
    let mut tool_calls = gateway.tool_calls.subscribe();

    let response = gateway
        .bridges
        .tools()
        .executor()
        .execute(&arguments, &stored)
        .await;

    assert!(!response.is_error());
    assert_eq!(response.content(), ["sunny".to_owned()]);
    let invocation = gateway
        .transport
        .requests()
        .into_iter()
        .find_map(|request| match request {
            RecordedRequest::InvokeTool(address, invoke) => Some((address, invoke)),
            _ => None,
        })
        .expect("tool invocation recorded");
    assert_eq!(invocation.0, "weather:9190");
    assert_eq!(invocation.1.headers.get("api-key").map(String::as_str), Some("k-123"));
    assert_eq!(invocation.1.configuration_uri, configuration_uri);

    let started = tool_calls.recv().await.expect("started event");
    let completed = tool_calls.recv().await.expect("completed event");
    assert_eq!(started.stage, ToolCallStage::Started);
    assert_eq!(started.service_address.as_deref(), Some("weather:9190"));
    assert_eq!(
        started.headers.as_ref().and_then(|headers| headers.get("api-key")).map(String::as_str),
        Some(REDACTED)
    );
    assert_eq!(completed.stage, ToolCallStage::Completed);
    assert_eq!(completed.event_id, started.event_id);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provisioning_without_backend_stores_nothing(gateway: Gateway) {
    let err = gateway
        .tools
        .provision_and_add(ToolPayload::new(forecast_tool()), gateway.bridges.tools())
        .await
        .expect_err("no backend serves the tool type");

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err, CatalogServiceError::Provisioning(_)));
    assert!(gateway.tools.list(None).await.expect("listing succeeds").is_empty());
    assert!(gateway.tool_manager.registered_names().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_header_argument_is_reported_to_the_agent(gateway: Gateway) {
    gateway
        .register_backend("weather-api", "weather", ServiceType::ToolInvoker)
        .await;

    let response = gateway
        .bridges
        .tools()
        .executor()
        .execute(&ToolArguments::new().with("city", "Oslo"), &forecast_tool())
        .await;

    assert!(response.is_error());
    assert!(
        response
            .content()
            .first()
            .is_some_and(|message| message.contains("api-key"))
    );
    assert!(gateway.transport.requests().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deregistered_backend_is_no_longer_resolved(gateway: Gateway) {
    let backend = gateway
        .register_backend("weather-api", "weather", ServiceType::ToolInvoker)
        .await;
    gateway
        .discovery
        .deregister(backend.id())
        .await
        .expect("deregistration succeeds");

    let err = gateway
        .bridges
        .tools()
        .executor()
        .try_execute(&ToolArguments::new().with("api-key", "k"), &forecast_tool())
        .await
        .expect_err("no backend left");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
