//! Streaming code execution through the gateway.

use super::helpers::{Gateway, gateway};
use capability_router::{
    bridge::{
        domain::{CodeExecutionReply, CodeExecutionTask, ExecutionStatus, OutputType},
        services::CapabilityKind,
    },
    error::ErrorKind,
    service_registry::domain::ServiceType,
};
use futures::StreamExt;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn engine_streams_output_until_completion(gateway: Gateway) {
    let engine = crate::test_helpers::target(
        "python",
        "sandbox",
        ServiceType::CodeExecutionEngine,
        &gateway.clock,
    )
    .with_sub_type("jvm");
    gateway
        .discovery
        .register(&engine)
        .await
        .expect("engine registration succeeds");
    gateway.transport.script_code_replies(
        vec![
            CodeExecutionReply::output(OutputType::Stdout, vec!["42".to_owned()]),
            CodeExecutionReply::finished(ExecutionStatus::Completed, 0),
        ],
        false,
    );

    let stream = gateway
        .bridges
        .code_execution()
        .execute_code("jvm", "python", &CodeExecutionTask::new("cHJpbnQoNDIp"))
        .await
        .expect("execution starts");
    assert_eq!(stream.address(), "sandbox:9190");
    let replies: Vec<_> = stream.collect().await;

    assert_eq!(replies.len(), 2);
    assert!(matches!(
        replies.last(),
        Some(Ok(reply)) if reply.status == ExecutionStatus::Completed
    ));
    assert_eq!(gateway.transport.open_executions(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tool_invoker_does_not_serve_code_execution(gateway: Gateway) {
    gateway
        .register_backend("python", "tools", ServiceType::ToolInvoker)
        .await;

    let result = gateway
        .bridges
        .code_execution()
        .execute_code("jvm", "python", &CodeExecutionTask::new(""))
        .await;

    assert!(matches!(result, Err(ref err) if err.kind() == ErrorKind::NotFound));
    assert_eq!(
        CapabilityKind::CodeExecution.service_type(),
        ServiceType::CodeExecutionEngine
    );
}
