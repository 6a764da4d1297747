//! Registry change notifications.

use crate::service_registry::domain::ServiceTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of change carried by a [`ServiceTargetEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A backend instance registered.
    Register,
    /// A backend instance deregistered or was swept.
    Deregister,
    /// A backend instance reported a new state.
    Update,
    /// A backend instance pinged.
    Ping,
    /// A health check produced a result.
    HealthCheck,
}

impl EventType {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "REGISTER",
            Self::Deregister => "DEREGISTER",
            Self::Update => "UPDATE",
            Self::Ping => "PING",
            Self::HealthCheck => "HEALTH_CHECK",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned while parsing an event type from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown event type: {0}")]
pub struct ParseEventTypeError(pub String);

impl TryFrom<&str> for EventType {
    type Error = ParseEventTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "REGISTER" => Ok(Self::Register),
            "DEREGISTER" => Ok(Self::Deregister),
            "UPDATE" => Ok(Self::Update),
            "PING" => Ok(Self::Ping),
            "HEALTH_CHECK" => Ok(Self::HealthCheck),
            other => Err(ParseEventTypeError(other.to_owned())),
        }
    }
}

/// A change to the set of registered backend instances.
///
/// `data` is an opaque structured payload; for target events it holds the
/// serialised [`ServiceTarget`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTargetEvent {
    event: EventType,
    id: String,
    data: serde_json::Value,
}

impl ServiceTargetEvent {
    /// Creates an event with an arbitrary payload.
    #[must_use]
    pub fn new(event: EventType, id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event,
            id: id.into(),
            data,
        }
    }

    /// Creates an event describing `target`.
    #[must_use]
    pub fn for_target(event: EventType, target: &ServiceTarget) -> Self {
        let data = serde_json::to_value(target).unwrap_or_default();
        Self::new(event, target.id().to_string(), data)
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event(&self) -> EventType {
        self.event
    }

    /// Returns the event identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the payload.
    #[must_use]
    pub const fn data(&self) -> &serde_json::Value {
        &self.data
    }
}
