//! When steps for stale cleanup BDD scenarios.

use super::world::{CleanupWorld, run_async};
use capability_router::service_registry::services::ServiceMaxAge;
use eyre::WrapErr;
use rstest_bdd_macros::when;

fn run_cleanup(
    world: &mut CleanupWorld,
    days: u32,
    inactive_only: bool,
) -> Result<(), eyre::Report> {
    let outcome = run_async(
        world
            .service
            .cleanup_stale(ServiceMaxAge::from_days(days), inactive_only),
    )
    .wrap_err("run stale cleanup")?;
    world.last_outcome = Some(outcome);
    Ok(())
}

#[when("stale cleanup runs with a maximum age of {days:u32} days")]
fn cleanup_runs(world: &mut CleanupWorld, days: u32) -> Result<(), eyre::Report> {
    run_cleanup(world, days, false)
}

#[when("inactive-only stale cleanup runs with a maximum age of {days:u32} days")]
fn inactive_only_cleanup_runs(world: &mut CleanupWorld, days: u32) -> Result<(), eyre::Report> {
    run_cleanup(world, days, true)
}
