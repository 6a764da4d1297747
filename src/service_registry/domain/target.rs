//! Registered backend instance model.

use super::{ParseServiceTypeError, ServiceRegistryDomainError, ServiceTargetId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability category a backend instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    /// Backend that invokes tools.
    ToolInvoker,
    /// Backend that acquires resources.
    ResourceProvider,
    /// Backend that runs code for a given engine and language.
    CodeExecutionEngine,
}

impl ServiceType {
    /// All service types, in listing order.
    pub const ALL: [Self; 3] = [
        Self::ToolInvoker,
        Self::ResourceProvider,
        Self::CodeExecutionEngine,
    ];

    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolInvoker => "tool-invoker",
            Self::ResourceProvider => "resource-provider",
            Self::CodeExecutionEngine => "code-execution-engine",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceType {
    type Error = ParseServiceTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "tool-invoker" => Ok(Self::ToolInvoker),
            "resource-provider" => Ok(Self::ResourceProvider),
            "code-execution-engine" => Ok(Self::CodeExecutionEngine),
            _ => Err(ParseServiceTypeError(value.to_owned())),
        }
    }
}

/// Language metadata advertised by code-execution engines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    /// Language name, for example `python`.
    pub name: Option<String>,
    /// Language type, for example `interpreted`.
    pub language_type: Option<String>,
    /// Language sub-type, for example a runtime flavour.
    pub sub_type: Option<String>,
}

/// One live, addressable backend instance.
///
/// Several targets may share `(service_type, service_sub_type, service_name)`;
/// they are replicas of one another. A target is never edited in place: a
/// re-registration replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceTarget {
    id: ServiceTargetId,
    service_name: String,
    host: String,
    port: u16,
    service_type: ServiceType,
    service_sub_type: Option<String>,
    language: LanguageDescriptor,
    registered_at: DateTime<Utc>,
}

impl ServiceTarget {
    /// Creates a target with a fresh identifier, stamped with the clock's
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceRegistryDomainError`] when the name or host is blank
    /// or the port is zero.
    pub fn new(
        service_name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        service_type: ServiceType,
        clock: &impl Clock,
    ) -> Result<Self, ServiceRegistryDomainError> {
        let normalized_name = service_name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ServiceRegistryDomainError::EmptyServiceName);
        }

        let normalized_host = host.into().trim().to_owned();
        if normalized_host.is_empty() {
            return Err(ServiceRegistryDomainError::EmptyHost);
        }

        if port == 0 {
            return Err(ServiceRegistryDomainError::InvalidPort);
        }

        Ok(Self {
            id: ServiceTargetId::new(),
            service_name: normalized_name,
            host: normalized_host,
            port,
            service_type,
            service_sub_type: None,
            language: LanguageDescriptor::default(),
            registered_at: clock.utc(),
        })
    }

    /// Uses an identifier assigned by the backend itself.
    #[must_use]
    pub const fn with_id(mut self, id: ServiceTargetId) -> Self {
        self.id = id;
        self
    }

    /// Sets the service sub-type (the engine type for code execution).
    #[must_use]
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        let normalized = sub_type.into().trim().to_owned();
        self.service_sub_type = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Sets language metadata.
    #[must_use]
    pub fn with_language(mut self, language: LanguageDescriptor) -> Self {
        self.language = language;
        self
    }

    /// Overrides the registration timestamp.
    #[must_use]
    pub const fn with_registered_at(mut self, registered_at: DateTime<Utc>) -> Self {
        self.registered_at = registered_at;
        self
    }

    /// Returns the target identifier.
    #[must_use]
    pub const fn id(&self) -> ServiceTargetId {
        self.id
    }

    /// Returns the service name (the capability type it serves, or the
    /// language for code-execution engines).
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the service type.
    #[must_use]
    pub const fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Returns the optional service sub-type.
    #[must_use]
    pub fn service_sub_type(&self) -> Option<&str> {
        self.service_sub_type.as_deref()
    }

    /// Returns language metadata.
    #[must_use]
    pub const fn language(&self) -> &LanguageDescriptor {
        &self.language
    }

    /// Returns when the target was registered.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns the dialable `host:port` address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} ({}) at {}:{}",
            self.service_name, self.service_type, self.host, self.port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::DefaultClock;
    use rstest::rstest;

    #[test]
    fn target_renders_address() {
        let target = ServiceTarget::new(
            "http",
            "10.0.0.4",
            9190,
            ServiceType::ToolInvoker,
            &DefaultClock,
        )
        .expect("valid target");

        assert_eq!(target.address(), "10.0.0.4:9190");
        assert_eq!(target.service_sub_type(), None);
    }

    #[rstest]
    #[case("", "localhost", 9000, ServiceRegistryDomainError::EmptyServiceName)]
    #[case("http", "  ", 9000, ServiceRegistryDomainError::EmptyHost)]
    #[case("http", "localhost", 0, ServiceRegistryDomainError::InvalidPort)]
    fn invalid_targets_are_rejected(
        #[case] name: &str,
        #[case] host: &str,
        #[case] port: u16,
        #[case] expected: ServiceRegistryDomainError,
    ) {
        let result = ServiceTarget::new(name, host, port, ServiceType::ToolInvoker, &DefaultClock);

        assert_eq!(result, Err(expected));
    }

    #[rstest]
    #[case("tool-invoker", ServiceType::ToolInvoker)]
    #[case("RESOURCE_PROVIDER", ServiceType::ResourceProvider)]
    #[case(" code-execution-engine ", ServiceType::CodeExecutionEngine)]
    fn parses_service_types(#[case] raw: &str, #[case] expected: ServiceType) {
        assert_eq!(ServiceType::try_from(raw), Ok(expected));
    }

    #[test]
    fn blank_sub_type_is_dropped() {
        let target = ServiceTarget::new(
            "python",
            "engine",
            9300,
            ServiceType::CodeExecutionEngine,
            &DefaultClock,
        )
        .expect("valid target")
        .with_sub_type("  ");

        assert_eq!(target.service_sub_type(), None);
    }
}
