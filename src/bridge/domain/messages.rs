//! Requests and replies exchanged with backend services.
//!
//! Field names follow the backend wire contract (camel case).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named text blob shipped during provisioning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedBlob {
    /// Name the backend stores the blob under.
    pub name: String,
    /// Raw blob text; may be empty.
    pub payload: String,
}

/// Ships configuration and secrets to a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    /// Configuration blob.
    pub configuration: NamedBlob,
    /// Secret blob.
    pub secret: NamedBlob,
}

/// URIs a backend assigned to provisioned blobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReply {
    /// Retrieval URI of the configuration blob.
    pub configuration_uri: String,
    /// Retrieval URI of the secret blob.
    pub secret_uri: String,
    /// Properties the backend reports for the capability.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Invokes a tool on a tool-invoker backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvokeRequest {
    /// Tool URI.
    pub uri: String,
    /// Request body; empty when the tool declares none.
    #[serde(default)]
    pub body: String,
    /// Provisioned configuration URI; empty when never provisioned.
    #[serde(rename = "configurationURI", default)]
    pub configuration_uri: String,
    /// Provisioned secrets URI; empty when never provisioned.
    #[serde(rename = "secretsURI", default)]
    pub secrets_uri: String,
    /// Service-scoped headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Every caller argument rendered as text.
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

/// Reply of a tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvokeReply {
    /// Whether the tool reported an error.
    #[serde(default)]
    pub is_error: bool,
    /// Text content items.
    #[serde(default)]
    pub content: Vec<String>,
}

/// Acquires a resource from a resource-provider backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequest {
    /// Backend-specific location.
    pub location: String,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name.
    pub name: String,
    /// Provisioned configuration URI; empty when never provisioned.
    #[serde(rename = "configurationURI", default)]
    pub configuration_uri: String,
    /// Provisioned secrets URI; empty when never provisioned.
    #[serde(rename = "secretsURI", default)]
    pub secrets_uri: String,
    /// Resource parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Reply of a resource acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReply {
    /// Whether the backend reported an error.
    #[serde(default)]
    pub is_error: bool,
    /// Text content items.
    #[serde(default)]
    pub content: Vec<String>,
}

/// Runs code on a code-execution engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExecutionRequest {
    /// `code-execution-engine://{engine}/{language}`.
    pub uri: String,
    /// Decoded source code.
    pub code: String,
    /// Execution timeout in seconds; zero leaves it to the engine.
    #[serde(default)]
    pub timeout: u64,
    /// Positional arguments keyed `arg0`, `arg1`, and so on.
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
    /// Environment variables.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// Lifecycle state carried by a code execution reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Accepted but not started.
    #[default]
    Pending,
    /// Producing output.
    Running,
    /// Finished normally.
    Completed,
    /// Finished with an error.
    Failed,
    /// Exceeded its timeout.
    Timeout,
    /// Cancelled before finishing.
    Cancelled,
}

impl ExecutionStatus {
    /// Returns whether no further replies follow this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Timeout | Self::Cancelled
        )
    }
}

/// Stream a code execution reply's content came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputType {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// Completion marker.
    Completion,
}

/// One reply of a code execution stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExecutionReply {
    /// Whether this reply reports an error.
    #[serde(default)]
    pub is_error: bool,
    /// Output lines.
    #[serde(default)]
    pub content: Vec<String>,
    /// Output stream.
    #[serde(default)]
    pub output_type: OutputType,
    /// Execution state.
    #[serde(default)]
    pub status: ExecutionStatus,
    /// Process exit code, meaningful on terminal replies.
    #[serde(default)]
    pub exit_code: i32,
    /// Emission time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl CodeExecutionReply {
    /// Creates a running reply carrying output lines.
    #[must_use]
    pub fn output(output_type: OutputType, content: Vec<String>) -> Self {
        Self {
            content,
            output_type,
            status: ExecutionStatus::Running,
            ..Self::default()
        }
    }

    /// Creates a terminal reply.
    #[must_use]
    pub fn finished(status: ExecutionStatus, exit_code: i32) -> Self {
        Self {
            is_error: matches!(status, ExecutionStatus::Failed | ExecutionStatus::Timeout),
            output_type: OutputType::Completion,
            status,
            exit_code,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn invoke_request_uses_wire_names() {
        let request = ToolInvokeRequest {
            uri: "http://api/forecast".to_owned(),
            configuration_uri: "mem://config/1".to_owned(),
            ..ToolInvokeRequest::default()
        };

        let value = serde_json::to_value(&request).expect("request serialises");

        assert_eq!(value.get("configurationURI"), Some(&json!("mem://config/1")));
        assert_eq!(value.get("secretsURI"), Some(&json!("")));
    }

    #[test]
    fn reply_defaults_missing_fields() {
        let reply: CodeExecutionReply =
            serde_json::from_value(json!({"status": "COMPLETED", "exitCode": 3}))
                .expect("reply parses");

        assert_eq!(reply.status, ExecutionStatus::Completed);
        assert_eq!(reply.exit_code, 3);
        assert!(reply.content.is_empty());
    }

    #[rstest]
    #[case(ExecutionStatus::Pending, false)]
    #[case(ExecutionStatus::Running, false)]
    #[case(ExecutionStatus::Completed, true)]
    #[case(ExecutionStatus::Failed, true)]
    #[case(ExecutionStatus::Timeout, true)]
    #[case(ExecutionStatus::Cancelled, true)]
    fn terminal_statuses(#[case] status: ExecutionStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }
}
