//! Activity aggregation and status classification.

use crate::service_registry::{
    domain::{ActivityRecord, HealthStatus, ServiceTarget, ServiceType},
    ports::{ServiceRegistry, ServiceRegistryResult},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Activity records per service name, as read from one capability kind.
///
/// Targets that never pinged contribute a `None` entry.
pub type ActivityStates = BTreeMap<String, Vec<Option<ActivityRecord>>>;

/// Activity records per service name after merging several kinds.
pub type MergedActivity = BTreeMap<String, Vec<ActivityRecord>>;

/// Merges activity maps from several capability kinds.
///
/// Lists under the same service name are concatenated in source order and
/// `None` entries are dropped.
#[must_use]
pub fn merge_activity_states<I>(sources: I) -> MergedActivity
where
    I: IntoIterator<Item = ActivityStates>,
{
    let mut merged = MergedActivity::new();
    for source in sources {
        for (service_name, records) in source {
            merged
                .entry(service_name)
                .or_default()
                .extend(records.into_iter().flatten());
        }
    }
    merged
}

/// Finds the activity record belonging to `target`.
#[must_use]
pub fn find_activity_record<'a>(
    target: &ServiceTarget,
    activity: &'a MergedActivity,
) -> Option<&'a ActivityRecord> {
    activity
        .get(target.service_name())?
        .iter()
        .find(|record| record.id() == target.id())
}

/// Liveness classification of a registered capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityStatus {
    /// The latest record reports the instance healthy.
    Active,
    /// A record exists but does not report the instance healthy.
    Inactive,
    /// No record was ever observed.
    Unknown,
}

impl CapabilityStatus {
    /// Classifies an optional activity record.
    #[must_use]
    pub const fn of(record: Option<&ActivityRecord>) -> Self {
        match record {
            None => Self::Unknown,
            Some(found) if found.is_active() => Self::Active,
            Some(_) => Self::Inactive,
        }
    }

    /// Returns the display form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CapabilityStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Classifies `target` against merged activity.
#[must_use]
pub fn classify(target: &ServiceTarget, activity: &MergedActivity) -> CapabilityStatus {
    CapabilityStatus::of(find_activity_record(target, activity))
}

/// Instance counts by health for one capability kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Instances reporting healthy.
    pub healthy: usize,
    /// Instances reporting unhealthy.
    pub unhealthy: usize,
    /// Instances reported down.
    pub down: usize,
    /// Instances with a pending status.
    pub pending: usize,
    /// Instances that never pinged.
    pub unknown: usize,
}

impl StatusCounts {
    fn count(&mut self, record: Option<&ActivityRecord>) {
        let bucket = match record.map(ActivityRecord::health_status) {
            Some(HealthStatus::Healthy) => &mut self.healthy,
            Some(HealthStatus::Unhealthy) => &mut self.unhealthy,
            Some(HealthStatus::Down) => &mut self.down,
            Some(HealthStatus::Pending) => &mut self.pending,
            None => &mut self.unknown,
        };
        *bucket += 1;
    }

    /// Returns the number of instances counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.healthy + self.unhealthy + self.down + self.pending + self.unknown
    }
}

/// Health counts across the whole fleet, per capability kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetStatistics {
    by_type: BTreeMap<ServiceType, StatusCounts>,
}

impl FleetStatistics {
    /// Returns the counts for one capability kind.
    #[must_use]
    pub fn for_type(&self, service_type: ServiceType) -> StatusCounts {
        self.by_type.get(&service_type).copied().unwrap_or_default()
    }

    /// Returns the number of registered instances across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_type.values().map(StatusCounts::total).sum()
    }
}

/// Reads activity from the registry, grouped for listing and statistics.
#[derive(Clone)]
pub struct ActivityService<R>
where
    R: ServiceRegistry,
{
    registry: Arc<R>,
}

impl<R> ActivityService<R>
where
    R: ServiceRegistry,
{
    /// Creates an activity service.
    #[must_use]
    pub const fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Returns registered targets of one kind.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn targets(
        &self,
        service_type: ServiceType,
    ) -> ServiceRegistryResult<Vec<ServiceTarget>> {
        self.registry.entries(service_type).await
    }

    /// Returns activity for every target of one kind, keyed by service name.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn activity_states(
        &self,
        service_type: ServiceType,
    ) -> ServiceRegistryResult<ActivityStates> {
        let mut states = ActivityStates::new();
        for target in self.registry.entries(service_type).await? {
            let record = self.registry.activity(target.id()).await?;
            states
                .entry(target.service_name().to_owned())
                .or_default()
                .push(record);
        }
        Ok(states)
    }

    /// Activity of tool invokers.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn tools_state(&self) -> ServiceRegistryResult<ActivityStates> {
        self.activity_states(ServiceType::ToolInvoker).await
    }

    /// Activity of resource providers.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn resources_state(&self) -> ServiceRegistryResult<ActivityStates> {
        self.activity_states(ServiceType::ResourceProvider).await
    }

    /// Counts registered instances by health for every capability kind.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn fleet_statistics(&self) -> ServiceRegistryResult<FleetStatistics> {
        let mut statistics = FleetStatistics::default();
        for target in self.registry.all_entries().await? {
            let record = self.registry.activity(target.id()).await?;
            statistics
                .by_type
                .entry(target.service_type())
                .or_default()
                .count(record.as_ref());
        }
        Ok(statistics)
    }
}
