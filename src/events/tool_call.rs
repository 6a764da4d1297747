//! Tool call lifecycle notifications.
//!
//! Every routed tool call emits `started`, then exactly one of `completed`
//! or `failed`. The terminal event reuses the identifier of its `started`
//! event. Credentials in headers, bodies and secret URIs are redacted before
//! an event leaves the executor.

use crate::bridge::domain::ToolInvokeRequest;
use crate::capability::domain::{CallableReference, ToolReference};
use crate::service_registry::domain::ServiceTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Replacement for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Replacement for bodies that mention sensitive fields.
pub const REDACTED_BODY: &str = "[body may contain sensitive data]";

const SENSITIVE_HEADERS: [&str; 7] = [
    "authorization",
    "x-api-key",
    "api-key",
    "auth-token",
    "bearer",
    "cookie",
    "session",
];

const SENSITIVE_FIELDS: [&str; 6] = [
    "password",
    "secret",
    "token",
    "apikey",
    "api_key",
    "credentials",
];

const ARGUMENT_MARKERS: [&str; 5] = [
    "invalid argument",
    "missing required",
    "validation failed",
    "invalid parameter",
    "bad request",
];

/// Lifecycle stage of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStage {
    /// The call was routed and is about to be sent.
    Started,
    /// The backend answered successfully.
    Completed,
    /// The backend reported an error or could not be reached.
    Failed,
}

impl ToolCallStage {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ToolCallStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Classification of a failed tool call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallErrorCategory {
    /// The call did not fail.
    #[default]
    None,
    /// The backend could not be reached in time.
    ServiceUnavailable,
    /// The tool definition cannot produce a valid request.
    ToolDefinitionError,
    /// The backend rejected the arguments.
    InvalidArguments,
    /// The tool ran and reported an error.
    ExecutionError,
    /// Anything else.
    Unknown,
}

impl ToolCallErrorCategory {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ServiceUnavailable => "service_unavailable",
            Self::ToolDefinitionError => "tool_definition_error",
            Self::InvalidArguments => "invalid_arguments",
            Self::ExecutionError => "execution_error",
            Self::Unknown => "unknown",
        }
    }

    /// Classifies the message of an error reply from a tool.
    #[must_use]
    pub fn of_reply(message: &str) -> Self {
        if mentions_arguments(message) {
            Self::InvalidArguments
        } else {
            Self::ExecutionError
        }
    }

    /// Classifies a malformed backend answer.
    #[must_use]
    pub fn of_protocol_error(message: &str) -> Self {
        if mentions_arguments(message) {
            Self::InvalidArguments
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ToolCallErrorCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn mentions_arguments(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ARGUMENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

fn redact_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let lowered = name.to_lowercase();
            let sensitive = SENSITIVE_HEADERS
                .iter()
                .any(|marker| lowered.contains(marker));
            let shown = if sensitive { REDACTED } else { value.as_str() };
            (name.clone(), shown.to_owned())
        })
        .collect()
}

fn redact_body(body: &str) -> String {
    let lowered = body.to_lowercase();
    if SENSITIVE_FIELDS.iter().any(|field| lowered.contains(field)) {
        REDACTED_BODY.to_owned()
    } else {
        body.to_owned()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// One step in the lifecycle of a tool call.
///
/// Fields that do not apply to the stage are omitted when serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallEvent {
    /// Identifier shared by every event of one call.
    pub event_id: Uuid,
    /// Lifecycle stage.
    pub stage: ToolCallStage,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
    /// Name of the called tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Type of the called tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    /// Identifier of the serving backend instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Address of the serving backend instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_address: Option<String>,
    /// Call arguments as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<BTreeMap<String, String>>,
    /// Service headers, with credentials redacted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Request body, replaced when it mentions sensitive fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Configuration URI forwarded with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_uri: Option<String>,
    /// Always [`REDACTED`] when a secrets URI was forwarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_uri: Option<String>,
    /// Whether the call failed; absent on `started`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    /// Reply content joined by newlines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Time from `started` to this event, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Failure classification.
    #[serde(default)]
    pub error_category: ToolCallErrorCategory,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ToolCallEvent {
    const fn bare(event_id: Uuid, stage: ToolCallStage, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id,
            stage,
            timestamp,
            tool_name: None,
            tool_type: None,
            service_id: None,
            service_address: None,
            arguments: None,
            headers: None,
            body: None,
            configuration_uri: None,
            secrets_uri: None,
            is_error: None,
            content: None,
            duration_ms: None,
            error_category: ToolCallErrorCategory::None,
            error_message: None,
        }
    }

    /// Describes a call about to be sent to `target`.
    #[must_use]
    pub fn started(
        timestamp: DateTime<Utc>,
        tool: &ToolReference,
        target: &ServiceTarget,
        request: &ToolInvokeRequest,
    ) -> Self {
        Self {
            tool_name: Some(tool.name().to_owned()),
            tool_type: Some(tool.capability_type().to_owned()),
            service_id: Some(target.id().to_string()),
            service_address: Some(target.address()),
            arguments: Some(request.arguments.clone()),
            headers: Some(redact_headers(&request.headers)),
            body: Some(redact_body(&request.body)),
            configuration_uri: non_empty(&request.configuration_uri),
            secrets_uri: non_empty(&request.secrets_uri).map(|_| REDACTED.to_owned()),
            ..Self::bare(Uuid::new_v4(), ToolCallStage::Started, timestamp)
        }
    }

    /// Completes the call started as `event_id`.
    #[must_use]
    pub fn completed(
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        content: String,
        duration: Duration,
    ) -> Self {
        Self {
            is_error: Some(false),
            content: Some(content),
            duration_ms: Some(millis(duration)),
            ..Self::bare(event_id, ToolCallStage::Completed, timestamp)
        }
    }

    /// Fails the call started as `event_id`.
    #[must_use]
    pub fn failed(
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        category: ToolCallErrorCategory,
        message: String,
        duration: Duration,
    ) -> Self {
        Self {
            is_error: Some(true),
            duration_ms: Some(millis(duration)),
            error_category: category,
            error_message: Some(message),
            ..Self::bare(event_id, ToolCallStage::Failed, timestamp)
        }
    }
}
