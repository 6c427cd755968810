use super::{CommonValidator, Validator};
use crate::args::ValidationArgs;
use crate::context::ValidationOutcome;
use crate::error::{Error, Result, ValidationError, ValidationFailure};
use crate::invoker::{Invocation, RunSummary};
use crate::message::{MessageType, Messages};
use crate::rule::PropertyRuleBuilder;
use crate::settings::ValidationDefaults;
use crate::text::to_camel_case;
use crate::value::FieldValue;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One registered validation, erased over its value type.
#[async_trait]
trait Member: Send + Sync {
    /// Messages of the member; the failure is kept only for cancellation.
    async fn run(&self, cancel: &CancellationToken) -> ValidationOutcome;
}

struct ValidatorMember<V: Validator> {
    validator: Arc<V>,
    value: Option<V::Value>,
    args: ValidationArgs,
}

#[async_trait]
impl<V: Validator> Member for ValidatorMember<V> {
    async fn run(&self, cancel: &CancellationToken) -> ValidationOutcome {
        let context = self
            .validator
            .validate_with(self.value.clone(), self.args.clone(), cancel)
            .await;
        let mut outcome = ValidationOutcome::from(context);
        if let Some(failure) = outcome.failure.take_if(|f| !f.is_cancelled()) {
            tracing::debug!(failure = %failure, "multi-validator member failed; keeping its messages only");
        }
        outcome
    }
}

#[async_trait]
impl Member for MultiValidator {
    async fn run(&self, cancel: &CancellationToken) -> ValidationOutcome {
        let result = self.validate(cancel).await;
        ValidationOutcome {
            messages: result.messages,
            failure: result.failure,
        }
    }
}

// ============================================================================
// MULTI VALIDATOR
// ============================================================================

/// Runs several unrelated validations and merges their messages.
///
/// Members run to completion in registration order. A member's fatal failure
/// is not propagated; only its messages are kept. Cancellation is the
/// exception: it stops the run and becomes the result's failure.
///
/// ```rust,ignore
/// let result = MultiValidator::new()
///     .add(Arc::clone(&person_validator), person)
///     .add_value("id", id, |r| r.mandatory())
///     .validate(&cancel)
///     .await;
/// if result.has_errors() { .. }
/// ```
#[derive(Default)]
#[must_use = "builder methods must be chained or built"]
pub struct MultiValidator {
    members: Vec<Box<dyn Member>>,
    defaults: Option<Arc<ValidationDefaults>>,
}

impl MultiValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for the value validators created by [`add_value`](Self::add_value).
    pub fn with_defaults(mut self, defaults: Arc<ValidationDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Adds `validator` over `value` with default arguments.
    pub fn add<V>(self, validator: Arc<V>, value: V::Value) -> Self
    where
        V: Validator + 'static,
    {
        self.add_with(validator, Some(value), ValidationArgs::default())
    }

    /// Adds `validator` over `value` with explicit arguments.
    pub fn add_with<V>(mut self, validator: Arc<V>, value: Option<V::Value>, args: ValidationArgs) -> Self
    where
        V: Validator + 'static,
    {
        self.members.push(Box::new(ValidatorMember { validator, value, args }));
        self
    }

    /// Adds an ad-hoc chain over a named value.
    ///
    /// Messages are reported at `name` (or its camelCase wire form).
    pub fn add_value<P, F>(self, name: &str, value: P, configure: F) -> Self
    where
        P: FieldValue,
        F: FnOnce(PropertyRuleBuilder<P, P>) -> PropertyRuleBuilder<P, P>,
    {
        let mut builder = CommonValidator::<P>::builder().rules(configure);
        if let Some(defaults) = &self.defaults {
            builder = builder.with_defaults(Arc::clone(defaults));
        }
        let args = ValidationArgs::new().with_path(name, to_camel_case(name));
        self.add_with(Arc::new(builder.build()), Some(value), args)
    }

    /// Adds another multi-validator; its messages are merged in place.
    pub fn add_multi(mut self, other: Self) -> Self {
        self.members.push(Box::new(other));
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Runs every member in order, through the configured invoker.
    pub async fn validate(&self, cancel: &CancellationToken) -> MultiValidatorResult {
        let defaults = self.defaults.clone().unwrap_or_default();
        let invocation = Invocation {
            validator: "MultiValidator",
            path: None,
            depth: 0,
        };

        let mut result = MultiValidatorResult::default();
        let outcome = {
            let result = &mut result;
            let run: BoxFuture<'_, _> = Box::pin(async move {
                self.run_members(result, cancel).await;
                result.summary()
            });
            defaults.invoker.invoke(invocation, run).await
        };

        if let Err(failure) = outcome {
            result.failure.get_or_insert(failure);
        }
        result
    }

    async fn run_members(&self, result: &mut MultiValidatorResult, cancel: &CancellationToken) {
        for member in &self.members {
            if cancel.is_cancelled() {
                result.failure = Some(ValidationFailure::Cancelled);
                return;
            }
            let outcome = member.run(cancel).await;
            result.messages.extend(outcome.messages);
            if let Some(failure) = outcome.failure {
                result.failure = Some(failure);
                return;
            }
        }
        if cancel.is_cancelled() {
            result.failure = Some(ValidationFailure::Cancelled);
        }
    }

    /// Runs every member and fails when any error was recorded.
    pub async fn validate_and_ensure_ok(&self, cancel: &CancellationToken) -> Result<MultiValidatorResult> {
        self.validate(cancel).await.ensure_ok(false)
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Merged messages of a [`MultiValidator`] run.
#[derive(Debug, Clone, Default)]
pub struct MultiValidatorResult {
    pub messages: Messages,
    failure: Option<ValidationFailure>,
}

impl MultiValidatorResult {
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn has_errors(&self) -> bool {
        self.messages.has_errors()
    }

    /// Set when the run was cancelled or refused by the invoker.
    pub fn failure(&self) -> Option<&ValidationFailure> {
        self.failure.as_ref()
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The error describing this run, if it did not succeed.
    ///
    /// A failure takes precedence over ordinary messages.
    pub fn to_error(&self) -> Option<Error> {
        if let Some(failure) = &self.failure {
            return Some(Error::Failure(failure.clone()));
        }
        self.has_errors()
            .then(|| Error::Validation(ValidationError::from_messages(&self.messages, false)))
    }

    /// Returns `self` when no error (or, with `include_warnings`, no warning)
    /// was recorded and the run did not fail.
    pub fn ensure_ok(self, include_warnings: bool) -> Result<Self> {
        if let Some(failure) = self.failure {
            return Err(Error::Failure(failure));
        }
        let warned = include_warnings && self.messages.contains_kind(MessageType::Warning);
        if self.has_errors() || warned {
            return Err(Error::Validation(ValidationError::from_messages(
                &self.messages,
                include_warnings,
            )));
        }
        Ok(self)
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            messages: self.messages.len(),
            has_errors: self.has_errors(),
            failed: self.has_failed(),
        }
    }
}
