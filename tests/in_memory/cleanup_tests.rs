//! Stale cleanup of backend registrations.

use super::helpers::{Gateway, gateway};
use capability_router::{
    events::EventType,
    service_registry::{
        adapters::memory::StaticHealthProbe,
        domain::{HealthStatus, ServiceType},
        ports::ServiceRegistry,
        services::{CapabilityListing, CapabilityStatus, HealthCheckService, ServiceMaxAge},
    },
};
use chrono::Duration;
use mockable::Clock;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn silent_backends_are_removed_and_announced(gateway: Gateway) {
    let silent = gateway
        .register_backend("weather-api", "weather", ServiceType::ToolInvoker)
        .await;
    gateway.clock.advance(Duration::days(2));
    let fresh = gateway
        .register_backend("s3", "storage", ServiceType::ResourceProvider)
        .await;
    gateway.discovery.ping(fresh.id()).await.expect("ping succeeds");
    let mut events = gateway.publisher.subscribe();

    let outcome = gateway
        .cleanup
        .cleanup_stale(gateway.config.default_max_age(), false)
        .await
        .expect("cleanup succeeds");

    assert_eq!(outcome.removed_count(), 1);
    assert!(outcome.is_success());
    assert_eq!(
        outcome.removed().first().map(|target| target.id()),
        Some(silent.id())
    );
    let event = events.recv().await.expect("deregistration event");
    assert_eq!(event.event(), EventType::Deregister);
    assert_eq!(event.id(), silent.id().to_string());

    let listing = CapabilityListing::with_timeout(
        Arc::clone(&gateway.registry),
        gateway.config.listing_timeout(),
    )
    .fetch()
    .await;
    assert_eq!(listing.len(), 1);
    assert!(
        listing
            .iter()
            .all(|summary| summary.target.id() == fresh.id()
                && summary.status == CapabilityStatus::Active)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inactive_only_keeps_unclassified_backends(gateway: Gateway) {
    gateway
        .register_backend("weather-api", "weather", ServiceType::ToolInvoker)
        .await;
    gateway.clock.advance(Duration::days(3));

    let stale = gateway
        .cleanup
        .find_stale(ServiceMaxAge::from_days(1), true)
        .await
        .expect("query succeeds");

    assert!(stale.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_health_checks_do_not_keep_a_backend_alive(gateway: Gateway) {
    let backend = gateway
        .register_backend("weather-api", "weather", ServiceType::ToolInvoker)
        .await;
    gateway.discovery.ping(backend.id()).await.expect("ping succeeds");
    let pinged_at = gateway.clock.utc();
    gateway.clock.advance(Duration::days(3));
    let probe = Arc::new(StaticHealthProbe::default());
    probe.set_unreachable(backend.id());
    let health = HealthCheckService::new(
        Arc::clone(&gateway.registry),
        probe,
        gateway.publisher.clone(),
        Arc::new(gateway.clock.clone()),
    )
    .with_probe_timeout(gateway.config.probe_timeout());

    let report = health.sweep().await.expect("sweep succeeds");
    let stale = gateway
        .cleanup
        .find_stale(ServiceMaxAge::from_days(1), true)
        .await
        .expect("query succeeds");

    assert_eq!(report.unhealthy, 1);
    let row = stale.first().expect("unreachable backend is stale");
    assert_eq!(stale.len(), 1);
    assert_eq!(row.target.id(), backend.id());
    assert_eq!(row.status, CapabilityStatus::Inactive);
    assert_eq!(row.last_seen, Some(pinged_at));
    let record = gateway
        .registry
        .activity(backend.id())
        .await
        .expect("lookup succeeds")
        .expect("activity recorded");
    assert_eq!(record.health_status(), HealthStatus::Down);
}
