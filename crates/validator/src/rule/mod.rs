//! Rules and rule chains
//!
//! - [`Rule`] — one atomic check against a field's [`PropertyContext`].
//! - [`Field`] — the accessor binding a chain is attached to.
//! - [`PropertyRule`] — the ordered, clause-gated chain of rules for one field,
//!   assembled through [`PropertyRuleBuilder`].
//! - [`ValidatorRule`] — anything an entity validator runs in order: chains,
//!   rule sets, base inclusions.

mod chain;
mod field;

pub use chain::{PropertyRule, PropertyRuleBuilder};
pub use field::Field;

use crate::clause::Clause;
use crate::context::{PropertyContext, ValidationContext};
use crate::error::ValidationFailure;
use crate::text::LText;
use crate::value::FieldValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// ============================================================================
// RULE
// ============================================================================

/// An atomic check bound to a field.
///
/// A rule records ordinary violations as messages on the context. Returning
/// `Err` is reserved for fatal conditions (a lookup that could not complete,
/// cancellation) and stops the whole run.
///
/// ```rust,ignore
/// struct NotReserved;
///
/// #[async_trait]
/// impl<T: FieldValue> Rule<T, String> for NotReserved {
///     async fn validate(
///         &self,
///         context: &mut PropertyContext<'_, T, String>,
///         _cancel: &CancellationToken,
///     ) -> Result<(), ValidationFailure> {
///         if context.value() == "admin" {
///             context.add_error("{0} is reserved.", &[]);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Rule<T, P>: Send + Sync {
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure>;
}

/// A rule with its own clauses and optional error-text override.
pub struct RuleEntry<T, P> {
    pub(crate) rule: Box<dyn Rule<T, P>>,
    pub(crate) clauses: Vec<Box<dyn Clause<T, P>>>,
    pub(crate) error_text: Option<LText>,
}

impl<T: FieldValue, P: FieldValue> RuleEntry<T, P> {
    pub fn new(rule: impl Rule<T, P> + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            clauses: Vec::new(),
            error_text: None,
        }
    }

    /// True when every clause of this rule passes.
    pub(crate) fn applies(&self, context: &PropertyContext<'_, T, P>) -> bool {
        self.clauses.iter().all(|clause| clause.check(context))
    }
}

// ============================================================================
// VALIDATOR RULE
// ============================================================================

/// A unit of work an entity validator runs against its context.
///
/// Implementations record their results on the context, including any fatal
/// failure.
#[async_trait]
pub trait ValidatorRule<T>: Send + Sync {
    async fn run(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken);
}

/// Runs `rules` in order, stopping once the run is fatally failed.
pub(crate) async fn run_all<T: FieldValue>(
    rules: &[Box<dyn ValidatorRule<T>>],
    context: &mut ValidationContext<T>,
    cancel: &CancellationToken,
) {
    for rule in rules {
        if cancel.is_cancelled() {
            tracing::debug!("validation cancelled between rules");
            context.cancel();
        }
        if context.has_failed() {
            return;
        }
        rule.run(context, cancel).await;
    }
}
