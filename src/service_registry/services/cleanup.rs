//! Age-based removal of stale registrations.

use super::RegistryServiceResult;
use super::activity::CapabilityStatus;
use crate::events::{EventPublisher, EventType, ServiceTargetEvent};
use crate::service_registry::{
    domain::{ServiceTarget, ServiceTargetId},
    ports::ServiceRegistry,
};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Maximum time since an instance was last seen before it counts as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceMaxAge(u64);

impl ServiceMaxAge {
    /// Creates a maximum age from seconds.
    #[must_use]
    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Creates a maximum age from whole days.
    #[must_use]
    pub fn from_days(days: u32) -> Self {
        Self(u64::from(days) * SECONDS_PER_DAY)
    }

    /// Returns the age in seconds.
    #[must_use]
    pub const fn as_seconds(self) -> u64 {
        self.0
    }

    fn as_delta(self) -> TimeDelta {
        i64::try_from(self.0)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

/// A registration that exceeded the maximum age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleCapability {
    /// The stale instance.
    pub target: ServiceTarget,
    /// Last activity, or `None` when the instance never pinged.
    pub last_seen: Option<DateTime<Utc>>,
    /// Liveness classification at sweep time.
    pub status: CapabilityStatus,
}

/// Result of a cleanup sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    removed: Vec<ServiceTarget>,
    failed: Vec<(ServiceTargetId, String)>,
}

impl CleanupOutcome {
    /// Returns the instances that were removed.
    #[must_use]
    pub fn removed(&self) -> &[ServiceTarget] {
        &self.removed
    }

    /// Returns how many instances were removed.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Returns the instances that could not be removed, with the reason.
    #[must_use]
    pub fn failed(&self) -> &[(ServiceTargetId, String)] {
        &self.failed
    }

    /// Returns how many removals failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Returns `true` when no removal failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Finds and removes registrations not seen within a maximum age.
///
/// An instance is stale when `now - last_seen > max_age` and, when
/// `inactive_only` is set, it is classified inactive. Instances that never
/// pinged are aged from their registration and classified unknown.
#[derive(Clone)]
pub struct StaleCleanupService<R, C>
where
    R: ServiceRegistry,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    publisher: EventPublisher,
    clock: Arc<C>,
}

impl<R, C> StaleCleanupService<R, C>
where
    R: ServiceRegistry,
    C: Clock + Send + Sync,
{
    /// Creates a cleanup service.
    #[must_use]
    pub const fn new(registry: Arc<R>, publisher: EventPublisher, clock: Arc<C>) -> Self {
        Self {
            registry,
            publisher,
            clock,
        }
    }

    /// Lists stale registrations without removing them.
    ///
    /// # Errors
    ///
    /// Returns registry errors.
    pub async fn find_stale(
        &self,
        max_age: ServiceMaxAge,
        inactive_only: bool,
    ) -> RegistryServiceResult<Vec<StaleCapability>> {
        let now = self.clock.utc();
        let threshold = max_age.as_delta();
        let mut stale = Vec::new();
        for target in self.registry.all_entries().await? {
            let record = self.registry.activity(target.id()).await?;
            let status = CapabilityStatus::of(record.as_ref());
            let last_seen = record.as_ref().map(|found| found.last_seen());
            let reference = last_seen.unwrap_or_else(|| target.registered_at());
            let aged_out = now.signed_duration_since(reference) > threshold;
            if aged_out && (!inactive_only || status == CapabilityStatus::Inactive) {
                stale.push(StaleCapability {
                    target,
                    last_seen,
                    status,
                });
            }
        }
        Ok(stale)
    }

    /// Removes stale registrations, publishing one deregistration event per
    /// removed instance.
    ///
    /// Each removal is attempted independently; failures are reported in the
    /// outcome rather than aborting the sweep.
    ///
    /// # Errors
    ///
    /// Returns registry errors raised while finding stale registrations.
    pub async fn cleanup_stale(
        &self,
        max_age: ServiceMaxAge,
        inactive_only: bool,
    ) -> RegistryServiceResult<CleanupOutcome> {
        let stale = self.find_stale(max_age, inactive_only).await?;
        let mut outcome = CleanupOutcome::default();
        for candidate in stale {
            let id = candidate.target.id();
            match self.registry.deregister(id, self.clock.utc()).await {
                Ok(Some(target)) => {
                    self.publisher
                        .publish(ServiceTargetEvent::for_target(EventType::Deregister, &target));
                    outcome.removed.push(target);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(id = %id, error = %err, "failed to remove stale service target");
                    outcome.failed.push((id, err.to_string()));
                }
            }
        }
        info!(
            max_age_seconds = max_age.as_seconds(),
            inactive_only,
            removed = outcome.removed_count(),
            failed = outcome.failed_count(),
            "stale cleanup finished"
        );
        Ok(outcome)
    }
}
