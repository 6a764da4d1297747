//! Result of shipping configuration and secrets to a backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Retrieval URIs assigned by a backend for provisioned configuration and
/// secrets, plus any properties it reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningReference {
    configuration_uri: String,
    secrets_uri: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

impl ProvisioningReference {
    /// Creates a provisioning reference.
    #[must_use]
    pub fn new(
        configuration_uri: impl Into<String>,
        secrets_uri: impl Into<String>,
        properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            configuration_uri: configuration_uri.into(),
            secrets_uri: secrets_uri.into(),
            properties,
        }
    }

    /// Returns the configuration URI.
    #[must_use]
    pub fn configuration_uri(&self) -> &str {
        &self.configuration_uri
    }

    /// Returns the secrets URI.
    #[must_use]
    pub fn secrets_uri(&self) -> &str {
        &self.secrets_uri
    }

    /// Returns properties reported by the backend.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
