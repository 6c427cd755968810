//! Presence and predicate rules: `mandatory`, `none`, `must`.

use crate::context::PropertyContext;
use crate::error::ValidationFailure;
use crate::rule::{PropertyRuleBuilder, Rule};
use crate::text::TextKey;
use crate::value::FieldValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Errors when the field has no value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mandatory;

#[async_trait]
impl<T: FieldValue, P: FieldValue> Rule<T, P> for Mandatory {
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if !context.value().has_value() {
            context.add_error(TextKey::Mandatory, &[]);
        }
        Ok(())
    }
}

/// Errors when the field has a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneRule;

#[async_trait]
impl<T: FieldValue, P: FieldValue> Rule<T, P> for NoneRule {
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if context.value().has_value() {
            context.add_error(TextKey::None, &[]);
        }
        Ok(())
    }
}

/// Errors when a predicate over the value is false.
pub struct Must<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for Must<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&P) -> bool + Send + Sync,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if !(self.0)(context.value()) {
            context.add_error(TextKey::Must, &[]);
        }
        Ok(())
    }
}

/// Errors when a predicate over the owning entity is false.
pub struct MustEntity<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for MustEntity<F>
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
        let holds = context.entity().is_none_or(|entity| (self.0)(entity));
        if !holds {
            context.add_error(TextKey::Must, &[]);
        }
        Ok(())
    }
}

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    /// The field must have a value.
    pub fn mandatory(self) -> Self {
        self.rule(Mandatory)
    }

    /// The field must not have a value.
    pub fn none(self) -> Self {
        self.rule(NoneRule)
    }

    /// The value must satisfy `predicate`.
    pub fn must<F>(self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.rule(Must(predicate))
    }

    /// The owning entity must satisfy `predicate`.
    pub fn must_entity<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.rule(MustEntity(predicate))
    }
}
