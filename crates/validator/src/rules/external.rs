//! Rules that delegate to caller-supplied checks: `exists`, `duplicate`,
//! `immutable`.
//!
//! The engine performs no I/O itself; `exists` awaits a caller lookup and
//! races it against cancellation.

use crate::context::PropertyContext;
use crate::error::ValidationFailure;
use crate::rule::{PropertyRuleBuilder, Rule};
use crate::text::TextKey;
use crate::value::FieldValue;
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Asynchronous existence check.
///
/// The lookup receives a copy of the value and resolves to `Ok(true)` when it
/// exists. A lookup error is fatal for the run.
pub struct Exists<F>(pub F);

#[async_trait]
impl<T, P, F, Fut> Rule<T, P> for Exists<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(P) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, ValidationFailure>> + Send,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if !context.value().has_value() {
            return Ok(());
        }

        let lookup = (self.0)(context.value().clone());
        let found = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(path = context.path(), "exists lookup cancelled");
                return Err(ValidationFailure::Cancelled);
            }
            found = lookup => found?,
        };

        if !found {
            context.add_error(TextKey::Exists, &[]);
        }
        Ok(())
    }
}

/// Errors when a predicate over the entity reports a duplicate.
pub struct Duplicate<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for Duplicate<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&T) -> bool + Send + Sync,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if context.entity().is_some_and(|entity| (self.0)(entity)) {
            context.add_error(TextKey::DuplicateExists, &[]);
        }
        Ok(())
    }
}

/// Errors when a predicate over the entity says the value changed.
///
/// The predicate returns true while the value is unchanged.
pub struct Immutable<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for Immutable<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&T) -> bool + Send + Sync,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if context.entity().is_some_and(|entity| !(self.0)(entity)) {
            context.add_error(TextKey::Immutable, &[]);
        }
        Ok(())
    }
}

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    /// The value must exist according to `lookup`.
    ///
    /// ```rust,ignore
    /// .exists(move |id: i64| {
    ///     let repo = Arc::clone(&repo);
    ///     async move { repo.contains(id).await.map_err(ValidationFailure::external) }
    /// })
    /// ```
    pub fn exists<F, Fut>(self, lookup: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, ValidationFailure>> + Send + 'static,
    {
        self.rule(Exists(lookup))
    }

    /// Errors when `predicate` reports that the entity would be a duplicate.
    pub fn duplicate<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.rule(Duplicate(predicate))
    }

    /// Errors unless `unchanged` holds.
    pub fn immutable<F>(self, unchanged: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.rule(Immutable(unchanged))
    }
}
