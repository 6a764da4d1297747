//! Given steps for stale cleanup BDD scenarios.

use super::world::{CleanupWorld, run_async};
use capability_router::service_registry::{
    domain::{ServiceState, ServiceType},
    ports::ServiceRegistry,
};
use chrono::Duration;
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::given;

fn register(
    world: &mut CleanupWorld,
    name: String,
    service_type: ServiceType,
    days: i64,
) -> Result<(), eyre::Report> {
    let backend = world.backend_registered_days_ago(&name, service_type, days);
    run_async(world.registry.register(&backend)).wrap_err("register backend for scenario")?;
    world.targets.insert(name, backend);
    Ok(())
}

fn ping_days_ago(world: &CleanupWorld, name: &str, days: i64) -> Result<(), eyre::Report> {
    let id = world.target(name)?.id();
    let seen_at = world.clock.utc() - Duration::days(days);
    run_async(world.registry.ping(id, seen_at)).wrap_err("record ping for scenario")?;
    Ok(())
}

#[given(r#"a tool invoker "{name}" last seen {days:i64} days ago"#)]
fn tool_invoker_last_seen(
    world: &mut CleanupWorld,
    name: String,
    days: i64,
) -> Result<(), eyre::Report> {
    register(world, name.clone(), ServiceType::ToolInvoker, days)?;
    ping_days_ago(world, &name, days)
}

#[given(r#"a resource provider "{name}" last seen {days:i64} days ago"#)]
fn resource_provider_last_seen(
    world: &mut CleanupWorld,
    name: String,
    days: i64,
) -> Result<(), eyre::Report> {
    register(world, name.clone(), ServiceType::ResourceProvider, days)?;
    ping_days_ago(world, &name, days)
}

#[given(r#"a tool invoker "{name}" registered {days:i64} days ago without reporting"#)]
fn tool_invoker_never_reported(
    world: &mut CleanupWorld,
    name: String,
    days: i64,
) -> Result<(), eyre::Report> {
    register(world, name, ServiceType::ToolInvoker, days)
}

#[given(r#"a tool invoker "{name}" reported down {days:i64} days ago"#)]
fn tool_invoker_reported_down(
    world: &mut CleanupWorld,
    name: String,
    days: i64,
) -> Result<(), eyre::Report> {
    register(world, name.clone(), ServiceType::ToolInvoker, days)?;
    let id = world.target(&name)?.id();
    let reported_at = world.clock.utc() - Duration::days(days);
    run_async(
        world
            .registry
            .record_state(id, ServiceState::down(reported_at, "connection refused")),
    )
    .wrap_err("record down state for scenario")?;
    Ok(())
}
