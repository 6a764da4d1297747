//! Shared helpers for integration tests.

use capability_router::service_registry::domain::{ServiceTarget, ServiceType};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::{EnvFilter, fmt};

/// Clock frozen at a settable instant; clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl Default for FixedClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }
}

impl FixedClock {
    /// Moves this clock, and every clone of it, forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds a target listening on `host:9190`.
pub fn target(
    name: &str,
    host: &str,
    service_type: ServiceType,
    clock: &FixedClock,
) -> ServiceTarget {
    ServiceTarget::new(name, host, 9190, service_type, clock).expect("valid service target")
}

/// Routes crate logs to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = fmt().with_env_filter(filter).with_test_writer().try_init() {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}
