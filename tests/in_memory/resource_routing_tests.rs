//! Resource provisioning and reads through the gateway.

use super::helpers::{Gateway, gateway};
use capability_router::{
    bridge::domain::{ERROR_MIME_TYPE, ResourceArguments, ResourceReply},
    capability::domain::{CallableReference, ResourcePayload, ResourceReference},
    service_registry::domain::ServiceType,
};
use rstest::rstest;

fn report() -> ResourceReference {
    ResourceReference::new("quarterly-report", "s3://reports/q1.csv", "s3")
        .expect("valid resource")
        .with_mime_type("text/csv")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provisioned_resource_is_read_with_its_mime_type(gateway: Gateway) {
    gateway
        .register_backend("s3", "storage", ServiceType::ResourceProvider)
        .await;
    let stored = gateway
        .resources
        .provision_and_add(
            ResourcePayload::new(report()).with_secrets("access-key: AK"),
            gateway.bridges.resources(),
        )
        .await
        .expect("provision and add should succeed");
    assert!(stored.secrets_uri().is_some());
    assert_eq!(
        gateway.resource_manager.registered_names(),
        vec!["quarterly-report".to_owned()]
    );
    gateway.transport.script_resource_reply(
        "s3://reports/q1.csv",
        ResourceReply {
            is_error: false,
            content: vec!["quarter,revenue\nq1,10".to_owned()],
        },
    );

    let contents = gateway
        .bridges
        .resources()
        .eval(&ResourceArguments::new("reports://q1"), &stored)
        .await;

    assert_eq!(contents.len(), 1);
    assert!(
        contents
            .iter()
            .all(|item| item.mime_type == "text/csv" && item.uri == "reports://q1")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_without_provider_yields_plain_text_error(gateway: Gateway) {
    let contents = gateway
        .bridges
        .resources()
        .eval(&ResourceArguments::new("reports://q1"), &report())
        .await;

    assert_eq!(contents.len(), 1);
    assert!(contents.iter().all(|item| item.mime_type == ERROR_MIME_TYPE));
}
