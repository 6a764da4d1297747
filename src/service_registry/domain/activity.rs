//! Liveness history for registered backend instances.

use super::{ParseHealthStatusError, ServiceTargetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of a backend instance as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// The instance answered its last probe or ping.
    Healthy,
    /// The instance is reachable but reports a problem.
    Unhealthy,
    /// The instance is unreachable or deregistered.
    Down,
    /// The instance registered but has not reported yet.
    Pending,
}

impl HealthStatus {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Unhealthy => "UNHEALTHY",
            Self::Down => "DOWN",
            Self::Pending => "PENDING",
        }
    }

    /// Returns the legacy boolean view of this status.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Maps the legacy boolean onto a status.
    #[must_use]
    pub const fn from_active(active: bool) -> Self {
        if active { Self::Healthy } else { Self::Down }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HealthStatus {
    type Error = ParseHealthStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "HEALTHY" => Ok(Self::Healthy),
            "UNHEALTHY" => Ok(Self::Unhealthy),
            "DOWN" => Ok(Self::Down),
            "PENDING" => Ok(Self::Pending),
            _ => Err(ParseHealthStatusError(value.to_owned())),
        }
    }
}

/// A single timestamped health observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredServiceState")]
pub struct ServiceState {
    timestamp: DateTime<Utc>,
    health_status: HealthStatus,
    reason: Option<String>,
}

impl ServiceState {
    /// Creates a state observation.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        health_status: HealthStatus,
        reason: Option<String>,
    ) -> Self {
        let normalized_reason = reason
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        Self {
            timestamp,
            health_status,
            reason: normalized_reason,
        }
    }

    /// A healthy observation.
    #[must_use]
    pub fn healthy(timestamp: DateTime<Utc>) -> Self {
        Self::new(timestamp, HealthStatus::Healthy, None)
    }

    /// An unhealthy observation with a reason.
    #[must_use]
    pub fn unhealthy(timestamp: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self::new(timestamp, HealthStatus::Unhealthy, Some(reason.into()))
    }

    /// A down observation with a reason.
    #[must_use]
    pub fn down(timestamp: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self::new(timestamp, HealthStatus::Down, Some(reason.into()))
    }

    /// An observation for an instance that has not reported yet.
    #[must_use]
    pub fn pending(timestamp: DateTime<Utc>) -> Self {
        Self::new(timestamp, HealthStatus::Pending, None)
    }

    /// Recorded when an instance deregisters.
    #[must_use]
    pub fn inactive(timestamp: DateTime<Utc>) -> Self {
        Self::down(timestamp, "deregistered")
    }

    /// Recorded for instances that registered and then never reported.
    #[must_use]
    pub fn missing_in_action(timestamp: DateTime<Utc>) -> Self {
        Self::new(
            timestamp,
            HealthStatus::Pending,
            Some("registered but never reported".to_owned()),
        )
    }

    /// Returns when the observation was made.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the observed health status.
    #[must_use]
    pub const fn health_status(&self) -> HealthStatus {
        self.health_status
    }

    /// Returns the legacy boolean view of the observation.
    #[must_use]
    pub const fn healthy_flag(&self) -> bool {
        self.health_status.is_active()
    }

    /// Returns the optional reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Storage shape accepted when reading states, including the legacy
/// boolean-only form.
#[derive(Deserialize)]
struct StoredServiceState {
    timestamp: DateTime<Utc>,
    #[serde(default)]
    health_status: Option<HealthStatus>,
    #[serde(default)]
    healthy: Option<bool>,
    #[serde(default)]
    reason: Option<String>,
}

impl From<StoredServiceState> for ServiceState {
    fn from(stored: StoredServiceState) -> Self {
        let health_status = resolve_status(stored.health_status, stored.healthy);
        Self::new(stored.timestamp, health_status, stored.reason)
    }
}

fn resolve_status(status: Option<HealthStatus>, active: Option<bool>) -> HealthStatus {
    match (status, active) {
        (Some(status), _) => status,
        (None, Some(flag)) => HealthStatus::from_active(flag),
        (None, None) => HealthStatus::Pending,
    }
}

/// Liveness history of a single backend instance.
///
/// Only `health_status` is persisted; the legacy `active` flag is derived on
/// read and accepted as input from older records that lack a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredActivityRecord")]
pub struct ActivityRecord {
    id: ServiceTargetId,
    last_seen: DateTime<Utc>,
    health_status: HealthStatus,
    states: Vec<ServiceState>,
}

#[derive(Deserialize)]
struct StoredActivityRecord {
    id: ServiceTargetId,
    last_seen: DateTime<Utc>,
    #[serde(default)]
    health_status: Option<HealthStatus>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    states: Vec<ServiceState>,
}

impl From<StoredActivityRecord> for ActivityRecord {
    fn from(stored: StoredActivityRecord) -> Self {
        Self {
            id: stored.id,
            last_seen: stored.last_seen,
            health_status: resolve_status(stored.health_status, stored.active),
            states: stored.states,
        }
    }
}

impl ActivityRecord {
    /// Creates the record for an instance's first ping.
    #[must_use]
    pub fn first_ping(id: ServiceTargetId, seen_at: DateTime<Utc>) -> Self {
        Self {
            id,
            last_seen: seen_at,
            health_status: HealthStatus::Healthy,
            states: Vec::new(),
        }
    }

    /// Creates a record with an explicit status and no history.
    #[must_use]
    pub const fn with_status(
        id: ServiceTargetId,
        last_seen: DateTime<Utc>,
        health_status: HealthStatus,
    ) -> Self {
        Self {
            id,
            last_seen,
            health_status,
            states: Vec::new(),
        }
    }

    /// Returns the identifier of the instance this record tracks.
    #[must_use]
    pub const fn id(&self) -> ServiceTargetId {
        self.id
    }

    /// Returns when the instance was last seen.
    #[must_use]
    pub const fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    /// Returns the current health status.
    #[must_use]
    pub const fn health_status(&self) -> HealthStatus {
        self.health_status
    }

    /// Returns the legacy boolean view: `true` exactly when healthy.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.health_status.is_active()
    }

    /// Returns the recorded state history, oldest first.
    #[must_use]
    pub fn states(&self) -> &[ServiceState] {
        &self.states
    }

    /// Returns whether the instance has ever reported a state.
    #[must_use]
    pub fn has_reported(&self) -> bool {
        !self.states.is_empty()
    }

    /// Applies a ping observed at `seen_at`.
    ///
    /// Returns `false` and leaves the record untouched when the ping is older
    /// than the last write.
    pub fn record_ping(&mut self, seen_at: DateTime<Utc>) -> bool {
        if seen_at < self.last_seen {
            return false;
        }
        self.last_seen = seen_at;
        self.health_status = HealthStatus::Healthy;
        true
    }

    /// Applies a state observation, trimming history beyond `max_states`.
    ///
    /// When the history is full the oldest half is discarded before the new
    /// state is appended. Observations never move `last_seen`; only pings and
    /// deregistration do. Returns `false` for observations older than the
    /// newest recorded state.
    pub fn record_state(&mut self, state: ServiceState, max_states: usize) -> bool {
        let superseded = self
            .states
            .last()
            .is_some_and(|latest| state.timestamp() < latest.timestamp());
        if superseded {
            return false;
        }

        if max_states > 0 && self.states.len() >= max_states {
            let discard = max_states.div_euclid(2).max(1).min(self.states.len());
            self.states.drain(..discard);
        }

        self.health_status = state.health_status();
        self.states.push(state);
        true
    }

    /// Records deregistration at `at` as the final observation.
    pub fn record_deregistration(&mut self, at: DateTime<Utc>, max_states: usize) {
        if at > self.last_seen {
            self.last_seen = at;
        }
        self.record_state(ServiceState::inactive(at), max_states);
    }
}
