//! Periodic health probing of registered instances.

use super::RegistryServiceResult;
use crate::events::{EventPublisher, EventType, ServiceTargetEvent};
use crate::service_registry::{
    domain::{HealthStatus, ServiceState, ServiceTarget, ServiceTargetId},
    ports::{HealthProbe, HealthProbeError, ServiceRegistry},
};
use futures::future::join_all;
use mockable::Clock;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default time allowed for one probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Counts produced by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthSweepReport {
    /// Instances probed during this sweep.
    pub checked: usize,
    /// Instances skipped because a probe was already running.
    pub skipped: usize,
    /// Probed instances that reported healthy.
    pub healthy: usize,
    /// Probed instances recorded as anything other than healthy.
    pub unhealthy: usize,
}

/// Probes registered instances and records the results.
///
/// A probe that fails or times out records the instance as down. At most one
/// probe per instance runs at a time.
pub struct HealthCheckService<R, P, C>
where
    R: ServiceRegistry,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    probe: Arc<P>,
    publisher: EventPublisher,
    clock: Arc<C>,
    probe_timeout: Duration,
    in_flight: Mutex<HashSet<ServiceTargetId>>,
}

struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<ServiceTargetId>>,
    id: ServiceTargetId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.in_flight.lock() {
            ids.remove(&self.id);
        }
    }
}

impl<R, P, C> HealthCheckService<R, P, C>
where
    R: ServiceRegistry,
    P: HealthProbe,
    C: Clock + Send + Sync,
{
    /// Creates a health check service with the default probe timeout.
    #[must_use]
    pub fn new(registry: Arc<R>, probe: Arc<P>, publisher: EventPublisher, clock: Arc<C>) -> Self {
        Self {
            registry,
            probe,
            publisher,
            clock,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Overrides the time allowed for one probe.
    #[must_use]
    pub const fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    fn claim(&self, id: ServiceTargetId) -> Option<InFlightGuard<'_>> {
        let mut ids = self.in_flight.lock().ok()?;
        ids.insert(id).then(|| InFlightGuard {
            in_flight: &self.in_flight,
            id,
        })
    }

    async fn observe(&self, target: &ServiceTarget) -> ServiceState {
        let probed = tokio::time::timeout(self.probe_timeout, self.probe.probe(target))
            .await
            .unwrap_or_else(|_| {
                Err(HealthProbeError::Timeout {
                    address: target.address(),
                })
            });
        let now = self.clock.utc();
        match probed {
            Ok(HealthStatus::Healthy) => ServiceState::healthy(now),
            Ok(status) => ServiceState::new(now, status, Some("reported by probe".to_owned())),
            Err(err) => {
                warn!(id = %target.id(), error = %err, "health probe failed");
                ServiceState::down(now, err.to_string())
            }
        }
    }

    /// Probes one instance and records the result.
    ///
    /// Returns `None` when a probe for the same instance is already running.
    ///
    /// # Errors
    ///
    /// Returns registry errors raised while recording the result.
    pub async fn check(
        &self,
        target: &ServiceTarget,
    ) -> RegistryServiceResult<Option<HealthStatus>> {
        let Some(_guard) = self.claim(target.id()) else {
            debug!(id = %target.id(), "health probe already running; skipped");
            return Ok(None);
        };
        let observation = self.observe(target).await;
        let status = observation.health_status();
        self.registry.record_state(target.id(), observation).await?;
        self.publisher
            .publish(ServiceTargetEvent::for_target(EventType::Update, target));
        Ok(Some(status))
    }

    /// Probes every registered instance concurrently.
    ///
    /// # Errors
    ///
    /// Returns registry errors raised while listing instances. Errors
    /// recording an individual result are logged and the instance is counted
    /// as skipped.
    pub async fn sweep(&self) -> RegistryServiceResult<HealthSweepReport> {
        let targets = self.registry.all_entries().await?;
        let results = join_all(targets.iter().map(|target| self.check(target))).await;

        let mut report = HealthSweepReport::default();
        for (target, result) in targets.iter().zip(results) {
            match result {
                Ok(Some(HealthStatus::Healthy)) => {
                    report.checked += 1;
                    report.healthy += 1;
                }
                Ok(Some(_)) => {
                    report.checked += 1;
                    report.unhealthy += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(err) => {
                    warn!(id = %target.id(), error = %err, "failed to record health check");
                    report.skipped += 1;
                }
            }
        }

        self.publisher.publish(ServiceTargetEvent::new(
            EventType::HealthCheck,
            self.clock.utc().to_rfc3339(),
            json!({
                "checked": report.checked,
                "skipped": report.skipped,
                "healthy": report.healthy,
                "unhealthy": report.unhealthy,
            }),
        ));
        info!(
            checked = report.checked,
            skipped = report.skipped,
            healthy = report.healthy,
            unhealthy = report.unhealthy,
            "health sweep finished"
        );
        Ok(report)
    }

    /// Sweeps every `interval` until the returned future is dropped.
    pub async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = self.sweep().await {
                warn!(error = %err, "health sweep failed");
            }
        }
    }
}
