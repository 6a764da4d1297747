//! Tool input schemas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `target` value marking a property that travels as a request header.
pub const TARGET_HEADER: &str = "header";

/// `scope` value marking a property consumed by the backend service.
pub const SCOPE_SERVICE: &str = "service";

/// Name of the property carrying the request body.
pub const BODY_PROPERTY: &str = "body";

/// One declared input of a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// JSON type of the value, for example `string`.
    #[serde(rename = "type")]
    pub property_type: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Where the value is delivered, for example [`TARGET_HEADER`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Who consumes the value, for example [`SCOPE_SERVICE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Default value used when the caller supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Property {
    /// Creates a property of the given type.
    #[must_use]
    pub fn new(property_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            property_type: property_type.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Marks the property as a service-scoped request header.
    #[must_use]
    pub fn as_service_header(mut self) -> Self {
        self.target = Some(TARGET_HEADER.to_owned());
        self.scope = Some(SCOPE_SERVICE.to_owned());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Returns whether the property is delivered as a service header.
    #[must_use]
    pub fn is_service_header(&self) -> bool {
        self.target.as_deref() == Some(TARGET_HEADER)
            && self.scope.as_deref() == Some(SCOPE_SERVICE)
    }
}

/// Input schema of a tool: named properties plus the required subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSchema {
    /// Schema type, normally `object`.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Declared properties by name.
    #[serde(default)]
    pub properties: BTreeMap<String, Property>,
    /// Names of properties the caller must supply.
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for InputSchema {
    fn default() -> Self {
        Self {
            schema_type: "object".to_owned(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

impl InputSchema {
    /// Adds or replaces a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Marks a property as required.
    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Returns the property declared under `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Iterates over service-scoped header properties.
    pub fn service_headers(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties
            .iter()
            .filter(|(_, property)| property.is_service_header())
            .map(|(name, property)| (name.as_str(), property))
    }

    /// Returns whether the schema declares a body property.
    #[must_use]
    pub fn declares_body(&self) -> bool {
        self.properties.contains_key(BODY_PROPERTY)
    }

    /// Adds server-reported properties as string properties described by
    /// their reported value. Properties already declared are left untouched.
    ///
    /// Returns how many properties were added.
    pub fn merge_reported(&mut self, reported: &BTreeMap<String, String>) -> usize {
        let mut added = 0;
        for (name, description) in reported {
            if !self.properties.contains_key(name) {
                self.properties
                    .insert(name.clone(), Property::new("string", description.clone()));
                added += 1;
            }
        }
        added
    }
}
