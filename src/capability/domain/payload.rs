//! Registration payloads carrying a capability plus its provisioning data.

use super::{ResourceReference, ToolReference};
use serde::{Deserialize, Serialize};

/// A capability submitted for registration together with the raw
/// configuration and secret text shipped to its backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPayload<E> {
    payload: E,
    #[serde(default)]
    configuration_data: String,
    #[serde(default)]
    secrets_data: String,
}

/// Registration payload for a tool.
pub type ToolPayload = CapabilityPayload<ToolReference>;

/// Registration payload for a resource.
pub type ResourcePayload = CapabilityPayload<ResourceReference>;

impl<E> CapabilityPayload<E> {
    /// Creates a payload with no configuration or secrets.
    #[must_use]
    pub const fn new(payload: E) -> Self {
        Self {
            payload,
            configuration_data: String::new(),
            secrets_data: String::new(),
        }
    }

    /// Sets the configuration text.
    #[must_use]
    pub fn with_configuration(mut self, configuration_data: impl Into<String>) -> Self {
        self.configuration_data = configuration_data.into();
        self
    }

    /// Sets the secret text.
    #[must_use]
    pub fn with_secrets(mut self, secrets_data: impl Into<String>) -> Self {
        self.secrets_data = secrets_data.into();
        self
    }

    /// Returns the capability.
    #[must_use]
    pub const fn payload(&self) -> &E {
        &self.payload
    }

    /// Returns the configuration text; empty when none was supplied.
    #[must_use]
    pub fn configuration_data(&self) -> &str {
        &self.configuration_data
    }

    /// Returns the secret text; empty when none was supplied.
    #[must_use]
    pub fn secrets_data(&self) -> &str {
        &self.secrets_data
    }

    /// Consumes the payload, returning the capability.
    #[must_use]
    pub fn into_payload(self) -> E {
        self.payload
    }
}
