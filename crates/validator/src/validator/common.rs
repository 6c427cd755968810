use super::entity::{NoAdditional, WithAdditional};
use super::hook::run_hook;
use super::{execute, short_type_name, EntityHook, Run, Validator};
use crate::args::ValidationArgs;
use crate::context::ValidationContext;
use crate::error::ValidationFailure;
use crate::rule::{PropertyRule, PropertyRuleBuilder, ValidatorRule};
use crate::settings::ValidationDefaults;
use crate::value::FieldValue;
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A reusable rule chain for a value type.
///
/// Defined once, then validated directly or attached to any field of that
/// type with [`PropertyRuleBuilder::common`]. Attached to a field, it reports
/// at the field's path and uses the field's text, unless the validator was
/// given explicit text.
///
/// ```rust,ignore
/// let postal_code = Arc::new(
///     CommonValidator::<String>::builder()
///         .rules(|r| r.mandatory().matches(POSTAL_CODE.clone()))
///         .build(),
/// );
///
/// EntityValidator::<Address>::builder()
///     .property(field!(Address, postal_code), |r| r.common(Arc::clone(&postal_code)))
///     .build();
/// ```
pub struct CommonValidator<P: FieldValue> {
    name: &'static str,
    chain: PropertyRule<P, P>,
    additional: Option<Box<dyn EntityHook<P>>>,
    defaults: Arc<ValidationDefaults>,
}

impl<P: FieldValue> CommonValidator<P> {
    pub fn builder() -> CommonValidatorBuilder<P> {
        CommonValidatorBuilder::new()
    }

    /// Explicit text, when the author set one.
    pub fn text(&self) -> Option<&str> {
        self.chain.field().text()
    }
}

#[async_trait]
impl<P: FieldValue> Run<P> for CommonValidator<P> {
    async fn run(&self, context: &mut ValidationContext<P>, cancel: &CancellationToken) {
        self.chain.run(context, cancel).await;
        if let Some(hook) = &self.additional {
            run_hook(hook.as_ref(), context, cancel).await;
        }
    }
}

#[async_trait]
impl<P: FieldValue> Validator for CommonValidator<P> {
    type Value = P;

    async fn validate_with(
        &self,
        value: Option<P>,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> ValidationContext<P> {
        execute(self.name, self, &self.defaults, value, args, cancel).await
    }
}

/// Fluent assembly of a [`CommonValidator`].
#[must_use = "builder methods must be chained or built"]
pub struct CommonValidatorBuilder<P: FieldValue, S = NoAdditional> {
    rules: PropertyRuleBuilder<P, P>,
    additional: Option<Box<dyn EntityHook<P>>>,
    defaults: Option<Arc<ValidationDefaults>>,
    _state: PhantomData<S>,
}

impl<P: FieldValue> CommonValidatorBuilder<P> {
    pub fn new() -> Self {
        Self {
            rules: PropertyRuleBuilder::for_value(),
            additional: None,
            defaults: None,
            _state: PhantomData,
        }
    }
}

impl<P: FieldValue> Default for CommonValidatorBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FieldValue, S> CommonValidatorBuilder<P, S> {
    /// Configures the value's rule chain.
    pub fn rules<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(PropertyRuleBuilder<P, P>) -> PropertyRuleBuilder<P, P>,
    {
        self.rules = configure(self.rules);
        self
    }

    /// Explicit text; wins over the text of any host field.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.rules = self.rules.text(text);
        self
    }

    pub fn with_defaults(mut self, defaults: Arc<ValidationDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn build(self) -> CommonValidator<P> {
        CommonValidator {
            name: short_type_name::<P>(),
            chain: self.rules.build(),
            additional: self.additional,
            defaults: self.defaults.unwrap_or_default(),
        }
    }
}

impl<P: FieldValue> CommonValidatorBuilder<P, NoAdditional> {
    /// Attaches the additional hook, run after the chain.
    pub fn additional<F>(self, hook: F) -> CommonValidatorBuilder<P, WithAdditional>
    where
        F: Fn(&mut ValidationContext<P>) -> Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        self.additional_hook(hook)
    }

    /// Asynchronous variant of [`additional`](Self::additional).
    pub fn additional_hook(self, hook: impl EntityHook<P> + 'static) -> CommonValidatorBuilder<P, WithAdditional> {
        CommonValidatorBuilder {
            rules: self.rules,
            additional: Some(Box::new(hook)),
            defaults: self.defaults,
            _state: PhantomData,
        }
    }
}
