//! In-memory capability repository.

use crate::capability::{
    domain::CallableReference,
    ports::{CapabilityRepository, CapabilityRepositoryError, CapabilityRepositoryResult},
};
use crate::label_expression::LabelExpression;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory repository keyed by capability name.
#[derive(Debug, Clone)]
pub struct InMemoryCapabilityRepository<E> {
    state: Arc<RwLock<BTreeMap<String, E>>>,
}

impl<E> Default for InMemoryCapabilityRepository<E> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<E: CallableReference> InMemoryCapabilityRepository<E> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CapabilityRepositoryResult<RwLockReadGuard<'_, BTreeMap<String, E>>> {
        self.state.read().map_err(|err| {
            CapabilityRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> CapabilityRepositoryResult<RwLockWriteGuard<'_, BTreeMap<String, E>>> {
        self.state.write().map_err(|err| {
            CapabilityRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl<E: CallableReference> CapabilityRepository<E> for InMemoryCapabilityRepository<E> {
    async fn persist(&self, capability: &E) -> CapabilityRepositoryResult<()> {
        let mut state = self.write()?;
        if state.contains_key(capability.name()) {
            return Err(CapabilityRepositoryError::already_exists::<E>(
                capability.name(),
            ));
        }
        state.insert(capability.name().to_owned(), capability.clone());
        Ok(())
    }

    async fn update(&self, capability: &E) -> CapabilityRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .get_mut(capability.name())
            .ok_or_else(|| CapabilityRepositoryError::not_found::<E>(capability.name()))?;
        *stored = capability.clone();
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> CapabilityRepositoryResult<Option<E>> {
        Ok(self.read()?.get(name).cloned())
    }

    async fn list_all(&self) -> CapabilityRepositoryResult<Vec<E>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn list_matching(&self, filter: &LabelExpression) -> CapabilityRepositoryResult<Vec<E>> {
        Ok(self
            .read()?
            .values()
            .filter(|capability| filter.matches(capability.labels()))
            .cloned()
            .collect())
    }

    async fn remove_by_name(&self, name: &str) -> CapabilityRepositoryResult<Option<E>> {
        Ok(self.write()?.remove(name))
    }

    async fn remove_if(&self, filter: &LabelExpression) -> CapabilityRepositoryResult<Vec<E>> {
        let mut state = self.write()?;
        let (removed, kept): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut *state)
            .into_iter()
            .partition(|(_, capability)| filter.matches(capability.labels()));
        *state = kept;
        Ok(removed.into_values().collect())
    }
}
