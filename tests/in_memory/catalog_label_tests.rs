//! Label filtering and batch label mutation across the tool catalog.

use super::helpers::{Gateway, gateway};
use capability_router::{
    capability::{
        domain::{CallableReference, Labels, ToolReference},
        services::LabelMutationService,
    },
    error::ErrorKind,
};
use rstest::rstest;

async fn seed(gateway: &Gateway) {
    for (name, category, env) in [
        ("forecast", "weather", "prod"),
        ("radar", "weather", "dev"),
        ("quote", "finance", "prod"),
    ] {
        let tool = ToolReference::new(name, format!("http://api/{name}"), "http")
            .expect("valid tool")
            .with_labels(
                Labels::from_pairs([("category", category), ("env", env)]).expect("valid labels"),
            );
        gateway.tools.add(tool).await.expect("add succeeds");
    }
}

fn names(tools: &[ToolReference]) -> Vec<&str> {
    tools.iter().map(CallableReference::name).collect()
}

#[rstest]
#[case(None, vec!["forecast", "quote", "radar"])]
#[case(Some(""), vec!["forecast", "quote", "radar"])]
#[case(Some("category=weather"), vec!["forecast", "radar"])]
#[case(Some("category=weather & !env=dev"), vec!["forecast"])]
#[case(Some("env=prod | category=weather"), vec!["forecast", "quote", "radar"])]
#[tokio::test(flavor = "multi_thread")]
async fn list_applies_label_filters(
    gateway: Gateway,
    #[case] filter: Option<&str>,
    #[case] expected: Vec<&str>,
) {
    seed(&gateway).await;

    let listed = gateway.tools.list(filter).await.expect("listing succeeds");

    assert_eq!(names(&listed), expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remove_if_unregisters_every_match(gateway: Gateway) {
    seed(&gateway).await;

    let removed = gateway
        .tools
        .remove_if("category=weather")
        .await
        .expect("removal succeeds");

    assert_eq!(names(&removed), vec!["forecast", "radar"]);
    assert_eq!(gateway.tool_manager.registered_names(), vec!["quote".to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn labels_are_added_and_removed_in_batches(gateway: Gateway) {
    seed(&gateway).await;
    let labels = LabelMutationService::new(std::sync::Arc::clone(&gateway.tool_repository));
    let owner = Labels::from_pairs([("owner", "platform")]).expect("valid labels");

    let added = labels
        .add_labels("env=prod", &owner)
        .await
        .expect("label addition succeeds");
    let removed = labels
        .remove_labels("owner=platform", &["owner"])
        .await
        .expect("label removal succeeds");

    assert!(added.is_success());
    assert_eq!(added.succeeded_count(), 2);
    assert_eq!(removed.updated().len(), 2);
    let filtered = gateway
        .tools
        .list(Some("owner=platform"))
        .await
        .expect("listing succeeds");
    assert!(filtered.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_filter_is_rejected(gateway: Gateway) {
    seed(&gateway).await;

    let err = gateway
        .tools
        .list(Some("category=(weather"))
        .await
        .expect_err("filter does not parse");

    assert_eq!(err.kind(), ErrorKind::InvalidExpression);
}
