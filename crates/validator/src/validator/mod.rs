//! Validators
//!
//! - [`EntityValidator`] — ordered field chains, rule sets, base inclusion
//!   and whole-entity hooks for one entity type.
//! - [`CollectionValidator`] / [`DictionaryValidator`] — item and entry walks
//!   with null, count and duplicate checks.
//! - [`CommonValidator`] — a reusable value-level chain.
//! - [`MultiValidator`] — several unrelated validations, one message list.
//!
//! All of them run through the same entry point, [`Validator::validate_with`],
//! which routes the run through the configured invoker.

mod collection;
mod common;
mod dictionary;
mod entity;
mod hook;
mod include_base;
mod multi;
mod rule_set;

pub use collection::{CollectionValidator, CollectionValidatorBuilder};
pub use common::{CommonValidator, CommonValidatorBuilder};
pub use dictionary::{DictionaryValidator, DictionaryValidatorBuilder};
pub use entity::{EntityValidator, EntityValidatorBuilder, NoAdditional, WithAdditional};
pub use hook::EntityHook;
pub use include_base::IncludeBase;
pub use multi::{MultiValidator, MultiValidatorResult};
pub use rule_set::{RuleSet, RuleSetBuilder};

use crate::args::ValidationArgs;
use crate::context::{join_path, last_segment, ValidationContext, ValidationOutcome, VALUE_NAME};
use crate::invoker::Invocation;
use crate::message::Message;
use crate::settings::ValidationDefaults;
use crate::text::{to_sentence_case, LText, TextKey};
use crate::value::{FieldValue, Nested};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ============================================================================
// VALIDATOR TRAIT
// ============================================================================

/// Anything that validates a value of one type.
///
/// ```rust,ignore
/// let context = validator.validate(order).await;
///
/// let cancel = CancellationToken::new();
/// let context = validator
///     .validate_with(Some(order), ValidationArgs::new().shallow(), &cancel)
///     .await;
/// ```
#[async_trait]
pub trait Validator: Send + Sync {
    type Value: FieldValue;

    /// Runs a validation.
    ///
    /// An absent value records a single mandatory error at the run's path and
    /// no rules run.
    async fn validate_with(
        &self,
        value: Option<Self::Value>,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> ValidationContext<Self::Value>;

    /// Validates `value` with default arguments and no cancellation.
    async fn validate(&self, value: Self::Value) -> ValidationContext<Self::Value> {
        let cancel = CancellationToken::new();
        self.validate_with(Some(value), ValidationArgs::default(), &cancel)
            .await
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

/// Body of a validator, run once the context exists and holds a value.
#[async_trait]
pub(crate) trait Run<T>: Send + Sync {
    async fn run(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken);
}

/// Shared entry point of every validator.
pub(crate) async fn execute<T, R>(
    name: &'static str,
    runner: &R,
    defaults: &Arc<ValidationDefaults>,
    value: Option<T>,
    args: ValidationArgs,
    cancel: &CancellationToken,
) -> ValidationContext<T>
where
    T: FieldValue,
    R: Run<T> + ?Sized,
{
    let mut context = ValidationContext::new(value, args, Arc::clone(defaults));

    let invocation = Invocation {
        validator: name,
        path: context.path().map(str::to_owned),
        depth: context.depth(),
    };
    let invoker = Arc::clone(&context.defaults().invoker);

    let result = {
        let context = &mut context;
        let run: BoxFuture<'_, _> = Box::pin(async move {
            if context.value().is_some() {
                runner.run(context, cancel).await;
            } else {
                add_absent_error(context);
            }
            context.summary()
        });
        invoker.invoke(invocation, run).await
    };

    if let Err(failure) = result {
        context.set_failure(failure);
    }
    context
}

/// Records the single mandatory error of a run without a value.
fn add_absent_error<T>(context: &mut ValidationContext<T>) {
    let path = context.value_path();
    let text = context
        .text()
        .map_or_else(|| to_sentence_case(last_segment(&path)), str::to_owned);
    let rendered = context.format(&LText::from(TextKey::Mandatory), &[text, String::new()]);
    context.add_message(Message::error(rendered).with_property(path));
}

/// Short type name used in diagnostics, e.g. `Order` for `app::model::Order`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ============================================================================
// AGGREGATE MESSAGES
// ============================================================================

/// Friendly text for messages about a whole collection or dictionary.
///
/// Explicit validator text, else the host field text, else the sentence-cased
/// last path segment (`Value` at the root).
pub(crate) fn aggregate_text<T>(explicit: Option<&str>, context: &ValidationContext<T>) -> String {
    explicit
        .or_else(|| context.text())
        .map_or_else(|| to_sentence_case(last_segment(&context.value_path())), str::to_owned)
}

/// Records an error against the run's own path.
pub(crate) fn add_aggregate_error<T>(context: &mut ValidationContext<T>, key: TextKey, text: &str, args: &[String]) {
    let mut all = Vec::with_capacity(args.len() + 2);
    all.push(text.to_owned());
    all.push(String::new());
    all.extend_from_slice(args);

    let rendered = context.format(&LText::from(key), &all);
    let path = context.value_path();
    context.add_message(Message::error(rendered).with_property(path));
}

/// Arguments for the nested run of one item or entry, `segment` being `[..]`.
pub(crate) fn element_args<T>(context: &ValidationContext<T>, segment: &str, text: &str) -> ValidationArgs {
    let path = join_path(Some(context.native_path().unwrap_or(VALUE_NAME)), segment);
    let wire_path = join_path(Some(context.wire_path().unwrap_or(VALUE_NAME)), segment);
    context.child_args(path, wire_path, Some(text.to_owned()))
}

// ============================================================================
// NESTED ADAPTER
// ============================================================================

/// Type-erased "validate this item" used by collection and dictionary walks.
#[async_trait]
pub(crate) trait NestedValidate<I>: Send + Sync {
    /// Validates the item, or returns `None` when it holds nothing.
    async fn validate_nested(
        &self,
        item: &I,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> Option<ValidationOutcome>;
}

pub(crate) struct NestedAdapter<E: FieldValue> {
    validator: Arc<dyn Validator<Value = E>>,
}

impl<E: FieldValue> NestedAdapter<E> {
    pub(crate) fn new(validator: Arc<dyn Validator<Value = E>>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl<I, E> NestedValidate<I> for NestedAdapter<E>
where
    I: Nested<E>,
    E: FieldValue,
{
    async fn validate_nested(
        &self,
        item: &I,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> Option<ValidationOutcome> {
        let value = item.nested()?.clone();
        let context = self.validator.validate_with(Some(value), args, cancel).await;
        Some(context.into())
    }
}
