//! Exposed tools, resources and the namespaces that group them.

use super::{CapabilityDomainError, CapabilityId, InputSchema, Labels, ProvisioningReference};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type used when a resource declares none.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Capability type reported by namespaces, which no backend serves.
pub const NAMESPACE_TYPE: &str = "namespace";

/// Behaviour shared by every exposed capability.
///
/// The capability type names the backend service that serves the capability
/// and is the key used for resolution.
pub trait CallableReference: Clone + fmt::Debug + Send + Sync + 'static {
    /// Kind name used in logs and errors.
    const KIND: &'static str;

    /// Returns the identifier.
    fn id(&self) -> CapabilityId;

    /// Returns the unique capability name.
    fn name(&self) -> &str;

    /// Returns the capability type, naming the serving backend.
    fn capability_type(&self) -> &str;

    /// Returns the labels.
    fn labels(&self) -> &Labels;

    /// Returns the labels for mutation.
    fn labels_mut(&mut self) -> &mut Labels;

    /// Returns the URI of provisioned configuration, if any.
    fn configuration_uri(&self) -> Option<&str>;

    /// Returns the URI of provisioned secrets, if any.
    fn secrets_uri(&self) -> Option<&str>;

    /// Returns the namespace the capability is exposed under, if any.
    fn namespace(&self) -> Option<&str>;

    /// Records the result of provisioning this capability.
    fn apply_provisioning(&mut self, provisioning: &ProvisioningReference);
}

fn required(
    value: impl Into<String>,
    error: CapabilityDomainError,
) -> Result<String, CapabilityDomainError> {
    let normalized = value.into().trim().to_owned();
    if normalized.is_empty() {
        return Err(error);
    }
    Ok(normalized)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// A tool routed to a tool-invoker backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReference {
    id: CapabilityId,
    name: String,
    #[serde(default)]
    description: String,
    uri: String,
    #[serde(rename = "type")]
    tool_type: String,
    #[serde(default)]
    input_schema: InputSchema,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    configuration_uri: Option<String>,
    #[serde(default)]
    secrets_uri: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

impl ToolReference {
    /// Creates a tool reference with an empty input schema.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError`] when the name, URI or type is blank.
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        tool_type: impl Into<String>,
    ) -> Result<Self, CapabilityDomainError> {
        Ok(Self {
            id: CapabilityId::new(),
            name: required(name, CapabilityDomainError::EmptyName)?,
            description: String::new(),
            uri: required(uri, CapabilityDomainError::EmptyAddress)?,
            tool_type: required(tool_type, CapabilityDomainError::EmptyType)?,
            input_schema: InputSchema::default(),
            labels: Labels::new(),
            configuration_uri: None,
            secrets_uri: None,
            namespace: None,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, input_schema: InputSchema) -> Self {
        self.input_schema = input_schema;
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = non_blank(namespace);
        self
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the URI forwarded to the backend.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }
}

impl CallableReference for ToolReference {
    const KIND: &'static str = "tool";

    fn id(&self) -> CapabilityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn capability_type(&self) -> &str {
        &self.tool_type
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }

    fn configuration_uri(&self) -> Option<&str> {
        self.configuration_uri.as_deref()
    }

    fn secrets_uri(&self) -> Option<&str> {
        self.secrets_uri.as_deref()
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn apply_provisioning(&mut self, provisioning: &ProvisioningReference) {
        self.configuration_uri = non_blank(provisioning.configuration_uri());
        self.secrets_uri = non_blank(provisioning.secrets_uri());
        self.input_schema.merge_reported(provisioning.properties());
    }
}

/// A named parameter forwarded with resource requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

/// A resource acquired from a resource-provider backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    id: CapabilityId,
    name: String,
    #[serde(default)]
    description: String,
    location: String,
    #[serde(rename = "type")]
    resource_type: String,
    mime_type: String,
    #[serde(default)]
    params: Vec<ResourceParam>,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    configuration_uri: Option<String>,
    #[serde(default)]
    secrets_uri: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

impl ResourceReference {
    /// Creates a resource reference with the default MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError`] when the name, location or type is
    /// blank.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Result<Self, CapabilityDomainError> {
        Ok(Self {
            id: CapabilityId::new(),
            name: required(name, CapabilityDomainError::EmptyName)?,
            description: String::new(),
            location: required(location, CapabilityDomainError::EmptyAddress)?,
            resource_type: required(resource_type, CapabilityDomainError::EmptyType)?,
            mime_type: DEFAULT_MIME_TYPE.to_owned(),
            params: Vec::new(),
            labels: Labels::new(),
            configuration_uri: None,
            secrets_uri: None,
            namespace: None,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the MIME type; blank values keep the default.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        if let Some(normalized) = non_blank(mime_type) {
            self.mime_type = normalized;
        }
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(ResourceParam {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = non_blank(namespace);
        self
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the backend-specific location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the MIME type of acquired content.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the parameters.
    #[must_use]
    pub fn params(&self) -> &[ResourceParam] {
        &self.params
    }
}

impl CallableReference for ResourceReference {
    const KIND: &'static str = "resource";

    fn id(&self) -> CapabilityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn capability_type(&self) -> &str {
        &self.resource_type
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }

    fn configuration_uri(&self) -> Option<&str> {
        self.configuration_uri.as_deref()
    }

    fn secrets_uri(&self) -> Option<&str> {
        self.secrets_uri.as_deref()
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn apply_provisioning(&mut self, provisioning: &ProvisioningReference) {
        self.configuration_uri = non_blank(provisioning.configuration_uri());
        self.secrets_uri = non_blank(provisioning.secrets_uri());
    }
}

/// A namespace grouping tools and resources under a path prefix.
///
/// Namespaces are labelled and filtered like any other capability but are
/// never routed to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceReference {
    id: CapabilityId,
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    labels: Labels,
}

impl NamespaceReference {
    /// Creates an unlabelled namespace without a path.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyName`] when the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, CapabilityDomainError> {
        Ok(Self {
            id: CapabilityId::new(),
            name: required(name, CapabilityDomainError::EmptyName)?,
            path: None,
            labels: Labels::new(),
        })
    }

    /// Sets the path prefix.
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = non_blank(path);
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Returns the path prefix, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl CallableReference for NamespaceReference {
    const KIND: &'static str = "namespace";

    fn id(&self) -> CapabilityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn capability_type(&self) -> &str {
        NAMESPACE_TYPE
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }

    fn configuration_uri(&self) -> Option<&str> {
        None
    }

    fn secrets_uri(&self) -> Option<&str> {
        None
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn apply_provisioning(&mut self, _provisioning: &ProvisioningReference) {}
}
