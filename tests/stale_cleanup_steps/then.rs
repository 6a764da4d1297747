//! Then steps for stale cleanup BDD scenarios.

use super::world::{CleanupWorld, run_async};
use capability_router::{events::EventType, service_registry::ports::ServiceRegistry};
use rstest_bdd_macros::then;

#[then("{count:usize} registrations are removed")]
fn registrations_removed(world: &CleanupWorld, count: usize) -> Result<(), eyre::Report> {
    let outcome = world
        .last_outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing cleanup outcome in scenario world"))?;
    if !outcome.is_success() {
        return Err(eyre::eyre!("cleanup reported failures: {:?}", outcome.failed()));
    }
    if outcome.removed_count() != count {
        return Err(eyre::eyre!(
            "expected {count} removals, found {}",
            outcome.removed_count()
        ));
    }
    Ok(())
}

#[then(r#"a deregistration event is published for "{name}""#)]
fn deregistration_published(world: &mut CleanupWorld, name: String) -> Result<(), eyre::Report> {
    let expected_id = world.target(&name)?.id().to_string();
    let mut deregistered = Vec::new();
    while let Ok(event) = world.events.try_recv() {
        if event.event() == EventType::Deregister {
            deregistered.push(event.id().to_owned());
        }
    }
    if !deregistered.contains(&expected_id) {
        return Err(eyre::eyre!(
            "expected a deregistration event for '{name}', saw {deregistered:?}"
        ));
    }
    Ok(())
}

#[then(r#""{name}" is still registered"#)]
fn still_registered(world: &CleanupWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.target(&name)?.id();
    let found = run_async(world.registry.find_by_id(id))
        .map_err(|err| eyre::eyre!("find_by_id failed: {err}"))?;
    if found.is_none() {
        return Err(eyre::eyre!("expected backend '{name}' to remain registered"));
    }
    Ok(())
}
