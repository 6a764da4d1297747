//! Capability manager that records registrations in memory.

use crate::capability::{
    domain::CallableReference,
    ports::{CapabilityManager, CapabilityManagerError, CapabilityManagerResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// Keeps announced capabilities in memory, for local runs and tests.
///
/// Names passed to [`RecordingCapabilityManager::reject`] fail registration.
#[derive(Debug, Clone)]
pub struct RecordingCapabilityManager<E> {
    state: Arc<RwLock<ManagerState<E>>>,
}

#[derive(Debug)]
struct ManagerState<E> {
    registered: BTreeMap<String, E>,
    rejected: BTreeSet<String>,
}

impl<E> Default for RecordingCapabilityManager<E> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(ManagerState {
                registered: BTreeMap::new(),
                rejected: BTreeSet::new(),
            })),
        }
    }
}

impl<E: CallableReference> RecordingCapabilityManager<E> {
    /// Creates a manager with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes registration of `name` fail.
    pub fn reject(&self, name: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            state.rejected.insert(name.into());
        }
    }

    /// Returns the names currently registered.
    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.registered.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the registered capability named `name`.
    #[must_use]
    pub fn registered(&self, name: &str) -> Option<E> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.registered.get(name).cloned())
    }
}

fn lock_failure(name: &str, err: &impl ToString) -> CapabilityManagerError {
    CapabilityManagerError {
        name: name.to_owned(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl<E: CallableReference> CapabilityManager<E> for RecordingCapabilityManager<E> {
    async fn register(&self, capability: &E) -> CapabilityManagerResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| lock_failure(capability.name(), &err))?;
        if state.rejected.contains(capability.name()) {
            return Err(CapabilityManagerError {
                name: capability.name().to_owned(),
                reason: "rejected".to_owned(),
            });
        }
        state
            .registered
            .insert(capability.name().to_owned(), capability.clone());
        Ok(())
    }

    async fn unregister(&self, name: &str) -> CapabilityManagerResult<()> {
        let mut state = self.state.write().map_err(|err| lock_failure(name, &err))?;
        state.registered.remove(name);
        Ok(())
    }
}
