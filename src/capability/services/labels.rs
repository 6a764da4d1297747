//! Batch label mutation across capabilities selected by an expression.

use super::CatalogServiceResult;
use crate::capability::{
    domain::{CallableReference, Labels},
    ports::CapabilityRepository,
};
use crate::label_expression::LabelExpression;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-entity results of a batch label mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    updated: Vec<String>,
    unchanged: Vec<String>,
    failed: Vec<(String, String)>,
}

impl BatchOutcome {
    /// Returns names of capabilities whose labels changed.
    #[must_use]
    pub fn updated(&self) -> &[String] {
        &self.updated
    }

    /// Returns names of matching capabilities that already had the labels.
    #[must_use]
    pub fn unchanged(&self) -> &[String] {
        &self.unchanged
    }

    /// Returns names and failure reasons of capabilities that could not be
    /// updated.
    #[must_use]
    pub fn failed(&self) -> &[(String, String)] {
        &self.failed
    }

    /// Returns how many capabilities were handled without error.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.updated.len() + self.unchanged.len()
    }

    /// Returns how many capabilities failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Returns whether no capability failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Adds or removes labels on every capability matching an expression.
///
/// Each capability is updated independently; a failure is recorded and the
/// batch continues.
pub struct LabelMutationService<E, R>
where
    E: CallableReference,
    R: CapabilityRepository<E>,
{
    repository: Arc<R>,
    kind: PhantomData<fn() -> E>,
}

impl<E, R> LabelMutationService<E, R>
where
    E: CallableReference,
    R: CapabilityRepository<E>,
{
    /// Creates a label mutation service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            kind: PhantomData,
        }
    }

    /// Applies `labels` to every capability matching `expression`.
    ///
    /// # Errors
    ///
    /// Returns an error when the expression does not parse or matching
    /// capabilities cannot be listed. Per-capability failures are reported
    /// in the outcome.
    pub async fn add_labels(
        &self,
        expression: &str,
        labels: &Labels,
    ) -> CatalogServiceResult<BatchOutcome> {
        self.mutate(expression, "add", |capability| {
            capability.labels_mut().merge(labels)
        })
        .await
    }

    /// Removes `keys` from every capability matching `expression`.
    ///
    /// # Errors
    ///
    /// Returns an error when the expression does not parse or matching
    /// capabilities cannot be listed. Per-capability failures are reported
    /// in the outcome.
    pub async fn remove_labels<S>(
        &self,
        expression: &str,
        keys: &[S],
    ) -> CatalogServiceResult<BatchOutcome>
    where
        S: AsRef<str> + Sync,
    {
        self.mutate(expression, "remove", |capability| {
            capability.labels_mut().remove_all(keys)
        })
        .await
    }

    async fn mutate<F>(
        &self,
        expression: &str,
        operation: &'static str,
        apply: F,
    ) -> CatalogServiceResult<BatchOutcome>
    where
        F: Fn(&mut E) -> bool + Sync,
    {
        let filter = LabelExpression::parse(expression)?;
        let matching = self.repository.list_matching(&filter).await?;

        let mut outcome = BatchOutcome::default();
        for mut capability in matching {
            let name = capability.name().to_owned();
            if !apply(&mut capability) {
                outcome.unchanged.push(name);
                continue;
            }
            match self.repository.update(&capability).await {
                Ok(()) => outcome.updated.push(name),
                Err(err) => {
                    warn!(kind = E::KIND, name, operation, error = %err, "label update failed");
                    outcome.failed.push((name, err.to_string()));
                }
            }
        }

        info!(
            kind = E::KIND,
            operation,
            filter = filter.as_str(),
            updated = outcome.updated.len(),
            unchanged = outcome.unchanged.len(),
            failed = outcome.failed.len(),
            "label batch finished"
        );
        Ok(outcome)
    }
}
