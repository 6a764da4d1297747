//! Key/value labels attached to callable references.

use super::CapabilityDomainError;
use crate::label_expression::LabelSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label map with unique keys; insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    /// Creates an empty label map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a label map from pairs; later duplicates overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyLabelKey`] for a blank key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CapabilityDomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut labels = Self::new();
        for (key, value) in pairs {
            labels.insert(key, value)?;
        }
        Ok(labels)
    }

    /// Sets `key` to `value`, returning whether the map changed.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDomainError::EmptyLabelKey`] for a blank key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<bool, CapabilityDomainError> {
        let normalized_key = key.into().trim().to_owned();
        if normalized_key.is_empty() {
            return Err(CapabilityDomainError::EmptyLabelKey);
        }
        let new_value = value.into();
        let previous = self.0.insert(normalized_key, new_value.clone());
        Ok(previous.as_ref() != Some(&new_value))
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    /// Applies every label of `other`, returning whether the map changed.
    pub fn merge(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (key, value) in &other.0 {
            if self.0.get(key) != Some(value) {
                self.0.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Removes every key in `keys`, returning whether the map changed.
    pub fn remove_all<S: AsRef<str>>(&mut self, keys: &[S]) -> bool {
        keys.iter()
            .fold(false, |changed, key| self.remove(key.as_ref()) || changed)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterates over labels in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl LabelSource for Labels {
    fn label(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}
