//! Agent-facing arguments and responses produced by the bridges.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Arguments an agent supplied when calling a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArguments(BTreeMap<String, Value>);

impl ToolArguments {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns an argument rendered as text; `null` counts as absent.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(render)
    }

    /// Renders every non-null argument as text.
    #[must_use]
    pub fn to_text_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(key, value)| render(value).map(|text| (key.clone(), text)))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for ToolArguments {
    fn from(arguments: BTreeMap<String, Value>) -> Self {
        Self(arguments)
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Result of a tool call as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    is_error: bool,
    content: Vec<String>,
}

impl ToolResponse {
    /// Creates a successful response with text content items.
    #[must_use]
    pub const fn success(content: Vec<String>) -> Self {
        Self {
            is_error: false,
            content,
        }
    }

    /// Creates an error-flagged response carrying one message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![message.into()],
        }
    }

    /// Returns whether the call failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// Returns the text content items.
    #[must_use]
    pub fn content(&self) -> &[String] {
        &self.content
    }
}

/// Arguments of a resource read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceArguments {
    /// URI the agent requested, echoed on every returned content item.
    pub request_uri: String,
}

impl ResourceArguments {
    /// Creates resource arguments for a request URI.
    #[must_use]
    pub fn new(request_uri: impl Into<String>) -> Self {
        Self {
            request_uri: request_uri.into(),
        }
    }
}

/// One text content item of a resource read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    /// Requested URI.
    pub uri: String,
    /// Text content.
    pub text: String,
    /// MIME type of the text.
    pub mime_type: String,
}

impl ResourceContent {
    /// Creates a text content item.
    #[must_use]
    pub fn text(
        uri: impl Into<String>,
        text: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A code execution submitted by a client.
///
/// `code` is expected to be base64 encoded; text that fails to decode is
/// forwarded unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExecutionTask {
    /// Base64-encoded source code.
    pub code: String,
    /// Execution timeout in seconds; zero leaves it to the engine.
    #[serde(default)]
    pub timeout: u64,
    /// Positional arguments.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Environment variables.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl CodeExecutionTask {
    /// Creates a task from base64-encoded code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Sets an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}
