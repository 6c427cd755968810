use crate::context::ValidationContext;
use crate::rule::{run_all, Field, PropertyRule, PropertyRuleBuilder, ValidatorRule};
use crate::value::FieldValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A group of rules gated by one predicate over the context.
///
/// When the predicate is false none of the group's rules run and nothing is
/// recorded. Rule sets are only created through
/// [`EntityValidatorBuilder::rule_set`](super::EntityValidatorBuilder::rule_set),
/// and [`RuleSetBuilder`] has no `rule_set` of its own, so they cannot nest.
pub struct RuleSet<T> {
    predicate: Box<dyn Fn(&ValidationContext<T>) -> bool + Send + Sync>,
    rules: Vec<Box<dyn ValidatorRule<T>>>,
}

impl<T: FieldValue> RuleSet<T> {
    pub(crate) fn builder<G>(predicate: G) -> RuleSetBuilder<T>
    where
        G: Fn(&ValidationContext<T>) -> bool + Send + Sync + 'static,
    {
        RuleSetBuilder {
            predicate: Box::new(predicate),
            rules: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl<T: FieldValue> ValidatorRule<T> for RuleSet<T> {
    async fn run(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken) {
        if !(self.predicate)(context) {
            tracing::trace!(rules = self.rules.len(), "rule set skipped: predicate not satisfied");
            return;
        }
        run_all(&self.rules, context, cancel).await;
    }
}

/// Fluent assembly of a [`RuleSet`].
#[must_use = "builder methods must be chained or built"]
pub struct RuleSetBuilder<T> {
    predicate: Box<dyn Fn(&ValidationContext<T>) -> bool + Send + Sync>,
    rules: Vec<Box<dyn ValidatorRule<T>>>,
}

impl<T: FieldValue> RuleSetBuilder<T> {
    /// Adds a rule chain for `field`.
    pub fn property<P, F>(self, field: Field<T, P>, configure: F) -> Self
    where
        P: FieldValue,
        F: FnOnce(PropertyRuleBuilder<T, P>) -> PropertyRuleBuilder<T, P>,
    {
        self.rule(configure(PropertyRule::builder(field)).build())
    }

    /// Adds any rule other than another rule set.
    pub fn rule(mut self, rule: impl ValidatorRule<T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub(crate) fn build(self) -> RuleSet<T> {
        RuleSet {
            predicate: self.predicate,
            rules: self.rules,
        }
    }
}
