//! Rules that hand the field value to another validator.

use crate::context::PropertyContext;
use crate::error::ValidationFailure;
use crate::rule::{PropertyRuleBuilder, Rule};
use crate::validator::{CollectionValidator, CommonValidator, DictionaryValidator, Validator};
use crate::value::{Entries, FieldValue, Items, Nested};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Validates the field value with a nested validator and merges the result.
///
/// The nested run is rooted at the field's path and inherits the field text,
/// run options and configuration. Absent values are skipped.
pub struct NestedRule<E: FieldValue> {
    validator: Arc<dyn Validator<Value = E>>,
    skip_when_shallow: bool,
}

impl<E: FieldValue> NestedRule<E> {
    /// Nested entity validation; skipped for shallow runs.
    pub fn entity(validator: Arc<dyn Validator<Value = E>>) -> Self {
        Self {
            validator,
            skip_when_shallow: true,
        }
    }

    /// Always runs; the nested validator decides what shallow means for it.
    pub fn value(validator: Arc<dyn Validator<Value = E>>) -> Self {
        Self {
            validator,
            skip_when_shallow: false,
        }
    }
}

#[async_trait]
impl<T, P, E> Rule<T, P> for NestedRule<E>
where
    T: FieldValue,
    P: Nested<E>,
    E: FieldValue,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if self.skip_when_shallow && context.parent().is_shallow() {
            tracing::trace!(path = context.path(), "nested validation skipped: shallow run");
            return Ok(());
        }
        let Some(value) = context.value().nested().cloned() else {
            return Ok(());
        };

        let nested = self
            .validator
            .validate_with(Some(value), context.child_args(), cancel)
            .await;
        context.merge(nested);
        Ok(())
    }
}

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    /// Validates the nested entity with `validator` (not when shallow).
    pub fn entity<V>(self, validator: Arc<V>) -> Self
    where
        V: Validator + 'static,
        P: Nested<V::Value>,
    {
        let validator: Arc<dyn Validator<Value = V::Value>> = validator;
        self.rule(NestedRule::entity(validator))
    }

    /// Validates the collection value.
    pub fn collection<C>(self, validator: Arc<CollectionValidator<C>>) -> Self
    where
        C: Items,
        P: Nested<C>,
    {
        let validator: Arc<dyn Validator<Value = C>> = validator;
        self.rule(NestedRule::value(validator))
    }

    /// Validates the dictionary value.
    pub fn dictionary<D>(self, validator: Arc<DictionaryValidator<D>>) -> Self
    where
        D: Entries,
        P: Nested<D>,
    {
        let validator: Arc<dyn Validator<Value = D>> = validator;
        self.rule(NestedRule::value(validator))
    }

    /// Applies a shared value validator to this field.
    ///
    /// Messages use the field's text unless the common validator set its own.
    pub fn common<E>(self, validator: Arc<CommonValidator<E>>) -> Self
    where
        E: FieldValue,
        P: Nested<E>,
    {
        let validator: Arc<dyn Validator<Value = E>> = validator;
        self.rule(NestedRule::value(validator))
    }
}
