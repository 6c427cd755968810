//! Rules that change the value or run arbitrary logic: `default_value`,
//! `override_value`, `custom`.

use crate::context::PropertyContext;
use crate::error::ValidationFailure;
use crate::rule::{PropertyRuleBuilder, Rule};
use crate::value::FieldValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Replaces the value with a computed default when it has none.
pub struct DefaultValue<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for DefaultValue<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&T) -> P + Send + Sync,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if context.value().has_value() {
            return Ok(());
        }
        if let Some(value) = context.entity().map(|entity| (self.0)(entity)) {
            context.set_value(value);
        }
        Ok(())
    }
}

/// Always replaces the value.
pub struct OverrideValue<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for OverrideValue<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&T) -> P + Send + Sync,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if let Some(value) = context.entity().map(|entity| (self.0)(entity)) {
            context.set_value(value);
        }
        Ok(())
    }
}

/// Arbitrary synchronous logic over the property context.
pub struct Custom<F>(pub F);

#[async_trait]
impl<T, P, F> Rule<T, P> for Custom<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&mut PropertyContext<'_, T, P>) -> Result<(), ValidationFailure> + Send + Sync,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        (self.0)(context)
    }
}

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    /// Fills in a value computed from the entity when the field has none.
    pub fn default_value<F>(self, value: F) -> Self
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        self.rule(DefaultValue(value))
    }

    /// Replaces the value with one computed from the entity.
    pub fn override_value<F>(self, value: F) -> Self
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        self.rule(OverrideValue(value))
    }

    /// Runs `check` against the property context.
    ///
    /// ```rust,ignore
    /// .custom(|pc| {
    ///     if pc.value().contains(' ') {
    ///         pc.add_warning("{0} contains spaces.", &[]);
    ///     }
    ///     Ok(())
    /// })
    /// ```
    pub fn custom<F>(self, check: F) -> Self
    where
        F: Fn(&mut PropertyContext<'_, T, P>) -> Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        self.rule(Custom(check))
    }
}
