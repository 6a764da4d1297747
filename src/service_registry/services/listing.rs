//! Concurrent capability listing with a shared deadline.

use super::activity::{
    ActivityService, ActivityStates, CapabilityStatus, find_activity_record,
    merge_activity_states,
};
use crate::service_registry::{
    domain::{ServiceTarget, ServiceType},
    ports::{ServiceRegistry, ServiceRegistryResult},
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::warn;

/// Default deadline for a whole listing.
pub const DEFAULT_LISTING_TIMEOUT: Duration = Duration::from_secs(15);

/// One row of the capability listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySummary {
    /// The registered instance.
    pub target: ServiceTarget,
    /// Liveness classification.
    pub status: CapabilityStatus,
    /// Last time the instance was seen, if ever.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Lists tool invokers and resource providers together with their liveness.
///
/// The four source reads run concurrently under one deadline; a source that
/// fails or misses the deadline contributes nothing instead of failing the
/// listing.
#[derive(Clone)]
pub struct CapabilityListing<R>
where
    R: ServiceRegistry,
{
    activity: ActivityService<R>,
    timeout: Duration,
}

impl<R> CapabilityListing<R>
where
    R: ServiceRegistry,
{
    /// Creates a listing with the default deadline.
    #[must_use]
    pub const fn new(registry: Arc<R>) -> Self {
        Self::with_timeout(registry, DEFAULT_LISTING_TIMEOUT)
    }

    /// Creates a listing bounded by `timeout`.
    #[must_use]
    pub const fn with_timeout(registry: Arc<R>, timeout: Duration) -> Self {
        Self {
            activity: ActivityService::new(registry),
            timeout,
        }
    }

    /// Fetches and combines every source.
    pub async fn fetch(&self) -> Vec<CapabilitySummary> {
        let deadline = Instant::now() + self.timeout;
        let (tools, tools_state, resources, resources_state) = tokio::join!(
            within(deadline, "tools", self.activity.targets(ServiceType::ToolInvoker)),
            within(deadline, "tools state", self.activity.tools_state()),
            within(
                deadline,
                "resources",
                self.activity.targets(ServiceType::ResourceProvider)
            ),
            within(deadline, "resources state", self.activity.resources_state()),
        );
        combine(
            tools.into_iter().chain(resources),
            [tools_state, resources_state],
        )
    }
}

async fn within<T, F>(deadline: Instant, source: &'static str, fetch: F) -> T
where
    T: Default,
    F: Future<Output = ServiceRegistryResult<T>>,
{
    match timeout_at(deadline, fetch).await {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            warn!(source, error = %err, "listing source failed; using empty result");
            T::default()
        }
        Err(_) => {
            warn!(source, "listing source timed out; using empty result");
            T::default()
        }
    }
}

fn combine<I>(targets: I, states: [ActivityStates; 2]) -> Vec<CapabilitySummary>
where
    I: IntoIterator<Item = ServiceTarget>,
{
    let merged = merge_activity_states(states);
    targets
        .into_iter()
        .map(|target| {
            let record = find_activity_record(&target, &merged);
            CapabilitySummary {
                status: CapabilityStatus::of(record),
                last_seen: record.map(|found| found.last_seen()),
                target,
            }
        })
        .collect()
}
