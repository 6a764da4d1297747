//! Router configuration.
//!
//! Every section is optional in the TOML source; omitted values take the
//! defaults below.
//!
//! ```toml
//! [transport]
//! deadline_seconds = 20
//!
//! [listing]
//! timeout_seconds = 15
//!
//! [health_check]
//! enabled = true
//! interval_seconds = 60
//! timeout_seconds = 5
//!
//! [registry]
//! max_state_count = 10
//!
//! [cleanup]
//! default_max_age_days = 1
//! ```

use crate::service_registry::services::ServiceMaxAge;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The source is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its permitted range.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Bridge transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-call deadline; code execution streams get twice this.
    pub deadline_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: 20,
        }
    }
}

/// Capability listing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Overall time allowed for one listing fan-out.
    pub timeout_seconds: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
        }
    }
}

/// Periodic health check settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether sweeps run at all.
    pub enabled: bool,
    /// Time between sweeps.
    pub interval_seconds: u64,
    /// Time allowed for one probe.
    pub timeout_seconds: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            timeout_seconds: 5,
        }
    }
}

/// Service registry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of recent states retained per instance.
    pub max_state_count: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_state_count: 10,
        }
    }
}

/// Stale cleanup settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Age used when a cleanup request names none.
    pub default_max_age_days: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            default_max_age_days: 1,
        }
    }
}

/// Complete router configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Bridge transport settings.
    pub transport: TransportConfig,
    /// Capability listing settings.
    pub listing: ListingConfig,
    /// Periodic health check settings.
    pub health_check: HealthCheckConfig,
    /// Service registry settings.
    pub registry: RegistryConfig,
    /// Stale cleanup settings.
    pub cleanup: CleanupConfig,
}

impl RouterConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// as [`RouterConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let source = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every value is within range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.deadline_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "transport.deadline_seconds",
                reason: "must be positive",
            });
        }
        if self.listing.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "listing.timeout_seconds",
                reason: "must be positive",
            });
        }
        if self.health_check.enabled && self.health_check.interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "health_check.interval_seconds",
                reason: "must be positive when health checks are enabled",
            });
        }
        if self.registry.max_state_count == 0 {
            return Err(ConfigError::Invalid {
                key: "registry.max_state_count",
                reason: "must retain at least one state",
            });
        }
        Ok(())
    }

    /// Returns the per-call transport deadline.
    #[must_use]
    pub const fn transport_deadline(&self) -> Duration {
        Duration::from_secs(self.transport.deadline_seconds)
    }

    /// Returns the listing fan-out timeout.
    #[must_use]
    pub const fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing.timeout_seconds)
    }

    /// Returns the time between health sweeps, or `None` when disabled.
    #[must_use]
    pub const fn health_check_interval(&self) -> Option<Duration> {
        if self.health_check.enabled {
            Some(Duration::from_secs(self.health_check.interval_seconds))
        } else {
            None
        }
    }

    /// Returns the time allowed for one health probe.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check.timeout_seconds)
    }

    /// Returns the cleanup age used when a request names none.
    #[must_use]
    pub fn default_max_age(&self) -> ServiceMaxAge {
        ServiceMaxAge::from_days(self.cleanup.default_max_age_days)
    }
}
