//! Adding, listing and removing exposed capabilities.

use super::{CatalogServiceError, CatalogServiceResult};
use crate::capability::{
    domain::{CallableReference, CapabilityPayload},
    ports::{
        CapabilityManager, CapabilityRepository, CapabilityRepositoryError, PayloadProvisioner,
    },
};
use crate::label_expression::LabelExpression;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keeps the repository and the protocol server's view of exposed
/// capabilities in step.
pub struct CapabilityCatalog<E, R, M>
where
    E: CallableReference,
    R: CapabilityRepository<E>,
    M: CapabilityManager<E>,
{
    repository: Arc<R>,
    manager: Arc<M>,
    kind: PhantomData<fn() -> E>,
}

impl<E, R, M> Clone for CapabilityCatalog<E, R, M>
where
    E: CallableReference,
    R: CapabilityRepository<E>,
    M: CapabilityManager<E>,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            manager: Arc::clone(&self.manager),
            kind: PhantomData,
        }
    }
}

impl<E, R, M> CapabilityCatalog<E, R, M>
where
    E: CallableReference,
    R: CapabilityRepository<E>,
    M: CapabilityManager<E>,
{
    /// Creates a catalog.
    #[must_use]
    pub const fn new(repository: Arc<R>, manager: Arc<M>) -> Self {
        Self {
            repository,
            manager,
            kind: PhantomData,
        }
    }

    async fn find_or_error(&self, name: &str) -> CatalogServiceResult<E> {
        self.repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| CatalogServiceError::NotFound {
                kind: E::KIND,
                name: name.to_owned(),
            })
    }

    /// Exposes a capability and stores it.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::AlreadyExists`](crate::error::ErrorKind)
    /// error when the name is taken, or manager and repository errors.
    pub async fn add(&self, capability: E) -> CatalogServiceResult<E> {
        if self.repository.find_by_name(capability.name()).await?.is_some() {
            return Err(CapabilityRepositoryError::already_exists::<E>(capability.name()).into());
        }
        self.manager.register(&capability).await?;
        if let Err(err) = self.repository.persist(&capability).await {
            if let Err(rollback) = self.manager.unregister(capability.name()).await {
                warn!(
                    kind = E::KIND,
                    name = capability.name(),
                    error = %rollback,
                    "failed to withdraw capability after persistence error"
                );
            }
            return Err(err.into());
        }
        info!(kind = E::KIND, name = capability.name(), "capability added");
        Ok(capability)
    }

    /// Provisions a payload's backend, stamps the result on the capability,
    /// then adds it.
    ///
    /// # Errors
    ///
    /// Returns provisioning errors before anything is stored, then the
    /// errors of [`CapabilityCatalog::add`].
    pub async fn provision_and_add<P>(
        &self,
        payload: CapabilityPayload<E>,
        provisioner: &P,
    ) -> CatalogServiceResult<E>
    where
        P: PayloadProvisioner<E> + ?Sized,
    {
        let provisioning = provisioner.provision(&payload).await?;
        let mut capability = payload.into_payload();
        capability.apply_provisioning(&provisioning);
        debug!(
            kind = E::KIND,
            name = capability.name(),
            configuration_uri = capability.configuration_uri().unwrap_or_default(),
            "capability provisioned"
        );
        self.add(capability).await
    }

    /// Replaces a stored capability and re-announces it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::NotFound`] when the name is unknown,
    /// or manager and repository errors.
    pub async fn update(&self, capability: E) -> CatalogServiceResult<E> {
        self.find_or_error(capability.name()).await?;
        self.repository.update(&capability).await?;
        self.manager.register(&capability).await?;
        Ok(capability)
    }

    /// Removes a capability by name and withdraws it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::NotFound`] when the name is unknown,
    /// or manager and repository errors.
    pub async fn remove(&self, name: &str) -> CatalogServiceResult<E> {
        let removed = self
            .repository
            .remove_by_name(name)
            .await?
            .ok_or_else(|| CatalogServiceError::NotFound {
                kind: E::KIND,
                name: name.to_owned(),
            })?;
        self.manager.unregister(name).await?;
        info!(kind = E::KIND, name, "capability removed");
        Ok(removed)
    }

    /// Removes every capability whose labels satisfy `expression`.
    ///
    /// A blank expression matches every capability. Withdrawal failures are
    /// logged and do not stop the removal of the remaining capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Expression`] when the expression does
    /// not parse, or repository errors.
    pub async fn remove_if(&self, expression: &str) -> CatalogServiceResult<Vec<E>> {
        let filter = LabelExpression::parse(expression)?;
        let removed = self.repository.remove_if(&filter).await?;
        for capability in &removed {
            if let Err(err) = self.manager.unregister(capability.name()).await {
                warn!(
                    kind = E::KIND,
                    name = capability.name(),
                    error = %err,
                    "failed to withdraw capability"
                );
            }
        }
        info!(
            kind = E::KIND,
            filter = filter.as_str(),
            removed = removed.len(),
            "capabilities removed"
        );
        Ok(removed)
    }

    /// Lists capabilities, optionally filtered by a label expression.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Expression`] when the filter does not
    /// parse, or repository errors.
    pub async fn list(&self, filter: Option<&str>) -> CatalogServiceResult<Vec<E>> {
        let parsed = LabelExpression::parse_optional(filter)?;
        let capabilities = if parsed.is_identity() {
            self.repository.list_all().await?
        } else {
            self.repository.list_matching(&parsed).await?
        };
        Ok(capabilities)
    }

    /// Finds a capability by name.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn find_by_name(&self, name: &str) -> CatalogServiceResult<Option<E>> {
        Ok(self.repository.find_by_name(name).await?)
    }
}
