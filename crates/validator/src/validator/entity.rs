use super::hook::run_hook;
use super::include_base::IncludeBase;
use super::rule_set::{RuleSet, RuleSetBuilder};
use super::{execute, short_type_name, EntityHook, Run, Validator};
use crate::args::ValidationArgs;
use crate::context::ValidationContext;
use crate::error::ValidationFailure;
use crate::rule::{run_all, Field, PropertyRule, PropertyRuleBuilder, ValidatorRule};
use crate::settings::ValidationDefaults;
use crate::value::{FieldValue, Inherits};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ============================================================================
// ENTITY VALIDATOR
// ============================================================================

/// Validator for one entity type.
///
/// A run goes through these stages, stopping as soon as the run is fatally
/// failed:
///
/// 1. Registered rules in registration order (field chains, rule sets,
///    base inclusions).
/// 2. The `on_validate` hook.
/// 3. The `additional` hook.
///
/// Built once and shared; every run gets its own [`ValidationContext`].
pub struct EntityValidator<T> {
    name: &'static str,
    rules: Vec<Box<dyn ValidatorRule<T>>>,
    on_validate: Option<Box<dyn EntityHook<T>>>,
    additional: Option<Box<dyn EntityHook<T>>>,
    defaults: Arc<ValidationDefaults>,
}

impl<T: FieldValue> EntityValidator<T> {
    /// Starts building a validator.
    pub fn builder() -> EntityValidatorBuilder<T> {
        EntityValidatorBuilder::new()
    }

    /// Name reported to the invoker.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn defaults(&self) -> &Arc<ValidationDefaults> {
        &self.defaults
    }

    /// Registered rules followed by `on_validate`; what a subtype includes.
    pub(crate) async fn run_rules(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken) {
        run_all(&self.rules, context, cancel).await;
        if let Some(hook) = &self.on_validate {
            run_hook(hook.as_ref(), context, cancel).await;
        }
    }
}

#[async_trait]
impl<T: FieldValue> Run<T> for EntityValidator<T> {
    async fn run(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken) {
        self.run_rules(context, cancel).await;
        if let Some(hook) = &self.additional {
            run_hook(hook.as_ref(), context, cancel).await;
        }
    }
}

#[async_trait]
impl<T: FieldValue> Validator for EntityValidator<T> {
    type Value = T;

    async fn validate_with(
        &self,
        value: Option<T>,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> ValidationContext<T> {
        execute(self.name, self, &self.defaults, value, args, cancel).await
    }
}

impl<T> fmt::Debug for EntityValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityValidator")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .field("on_validate", &self.on_validate.is_some())
            .field("additional", &self.additional.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder state: no additional hook attached yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdditional;

/// Builder state: the additional hook is attached and cannot be replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct WithAdditional;

/// Fluent assembly of an [`EntityValidator`].
///
/// The additional hook can be attached once; the second call does not exist
/// on [`EntityValidatorBuilder<T, WithAdditional>`].
///
/// ```rust,ignore
/// let validator = EntityValidator::<Person>::builder()
///     .property(field!(Person, id), |r| r.mandatory())
///     .property(field!(Person, name), |r| r.mandatory().max_length(50))
///     .rule_set(|ctx| ctx.operation() == OperationType::Create, |rs| {
///         rs.property(field!(Person, email), |r| r.mandatory().email())
///     })
///     .include_base(Arc::clone(&party_validator))
///     .additional(|ctx: &mut ValidationContext<Person>| Ok(()))
///     .build();
/// ```
#[must_use = "builder methods must be chained or built"]
pub struct EntityValidatorBuilder<T, S = NoAdditional> {
    name: &'static str,
    rules: Vec<Box<dyn ValidatorRule<T>>>,
    on_validate: Option<Box<dyn EntityHook<T>>>,
    additional: Option<Box<dyn EntityHook<T>>>,
    defaults: Option<Arc<ValidationDefaults>>,
    _state: PhantomData<S>,
}

impl<T: FieldValue> EntityValidatorBuilder<T> {
    pub fn new() -> Self {
        Self {
            name: short_type_name::<T>(),
            rules: Vec::new(),
            on_validate: None,
            additional: None,
            defaults: None,
            _state: PhantomData,
        }
    }
}

impl<T: FieldValue> Default for EntityValidatorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldValue, S> EntityValidatorBuilder<T, S> {
    /// Adds a rule chain for `field`.
    pub fn property<P, F>(self, field: Field<T, P>, configure: F) -> Self
    where
        P: FieldValue,
        F: FnOnce(PropertyRuleBuilder<T, P>) -> PropertyRuleBuilder<T, P>,
    {
        self.rule(configure(PropertyRule::builder(field)).build())
    }

    /// Adds a group of chains that runs only when `predicate` holds.
    pub fn rule_set<G, F>(self, predicate: G, configure: F) -> Self
    where
        G: Fn(&ValidationContext<T>) -> bool + Send + Sync + 'static,
        F: FnOnce(RuleSetBuilder<T>) -> RuleSetBuilder<T>,
    {
        self.rule(configure(RuleSet::builder(predicate)).build())
    }

    /// Runs `base`'s rules against the ancestor view of each value.
    pub fn include_base<B>(self, base: Arc<EntityValidator<B>>) -> Self
    where
        B: FieldValue,
        T: Inherits<B>,
    {
        self.rule(IncludeBase::new(base))
    }

    /// Adds any [`ValidatorRule`].
    pub fn rule(mut self, rule: impl ValidatorRule<T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Sets the whole-entity hook run after the rules.
    pub fn on_validate<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ValidationContext<T>) -> Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        self.on_validate_hook(hook)
    }

    /// Asynchronous variant of [`on_validate`](Self::on_validate).
    pub fn on_validate_hook(mut self, hook: impl EntityHook<T> + 'static) -> Self {
        self.on_validate = Some(Box::new(hook));
        self
    }

    /// Uses `defaults` instead of [`ValidationDefaults::default`].
    pub fn with_defaults(mut self, defaults: Arc<ValidationDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Overrides the name reported to the invoker.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn build(self) -> EntityValidator<T> {
        EntityValidator {
            name: self.name,
            rules: self.rules,
            on_validate: self.on_validate,
            additional: self.additional,
            defaults: self.defaults.unwrap_or_default(),
        }
    }
}

impl<T: FieldValue> EntityValidatorBuilder<T, NoAdditional> {
    /// Attaches the caller's additional hook, run last.
    pub fn additional<F>(self, hook: F) -> EntityValidatorBuilder<T, WithAdditional>
    where
        F: Fn(&mut ValidationContext<T>) -> Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        self.additional_hook(hook)
    }

    /// Asynchronous variant of [`additional`](Self::additional).
    pub fn additional_hook(self, hook: impl EntityHook<T> + 'static) -> EntityValidatorBuilder<T, WithAdditional> {
        EntityValidatorBuilder {
            name: self.name,
            rules: self.rules,
            on_validate: self.on_validate,
            additional: Some(Box::new(hook)),
            defaults: self.defaults,
            _state: PhantomData,
        }
    }
}
