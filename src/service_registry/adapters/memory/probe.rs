//! Scripted health probe for tests and local runs.

use crate::service_registry::{
    domain::{HealthStatus, ServiceTarget, ServiceTargetId},
    ports::{HealthProbe, HealthProbeError},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Health probe that answers from a preconfigured table.
///
/// Targets without an entry report `default_status`. Targets marked as
/// unreachable fail with [`HealthProbeError::Timeout`].
#[derive(Debug, Clone)]
pub struct StaticHealthProbe {
    state: Arc<RwLock<ProbeTable>>,
}

#[derive(Debug)]
struct ProbeTable {
    default_status: HealthStatus,
    statuses: HashMap<ServiceTargetId, HealthStatus>,
    unreachable: HashSet<ServiceTargetId>,
}

impl Default for StaticHealthProbe {
    fn default() -> Self {
        Self::new(HealthStatus::Healthy)
    }
}

impl StaticHealthProbe {
    /// Creates a probe reporting `default_status` for unknown targets.
    #[must_use]
    pub fn new(default_status: HealthStatus) -> Self {
        Self {
            state: Arc::new(RwLock::new(ProbeTable {
                default_status,
                statuses: HashMap::new(),
                unreachable: HashSet::new(),
            })),
        }
    }

    /// Sets the status reported for one target.
    pub fn set_status(&self, id: ServiceTargetId, status: HealthStatus) {
        if let Ok(mut table) = self.state.write() {
            table.unreachable.remove(&id);
            table.statuses.insert(id, status);
        }
    }

    /// Makes probes to one target time out.
    pub fn set_unreachable(&self, id: ServiceTargetId) {
        if let Ok(mut table) = self.state.write() {
            table.unreachable.insert(id);
        }
    }
}

#[async_trait]
impl HealthProbe for StaticHealthProbe {
    async fn probe(&self, target: &ServiceTarget) -> Result<HealthStatus, HealthProbeError> {
        let table = self.state.read().map_err(|err| {
            HealthProbeError::failed(target.address(), std::io::Error::other(err.to_string()))
        })?;
        if table.unreachable.contains(&target.id()) {
            return Err(HealthProbeError::Timeout {
                address: target.address(),
            });
        }
        Ok(table
            .statuses
            .get(&target.id())
            .copied()
            .unwrap_or(table.default_status))
    }
}
