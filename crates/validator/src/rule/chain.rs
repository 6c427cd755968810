use super::{Field, Rule, RuleEntry, ValidatorRule};
use crate::clause::Clause;
use crate::context::{PropertyContext, ValidationContext};
use crate::text::LText;
use crate::value::FieldValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// ============================================================================
// PROPERTY RULE
// ============================================================================

/// The rule chain for one field.
///
/// Execution:
///
/// 1. Skip when a selected-field filter names another field.
/// 2. Skip when any chain clause fails.
/// 3. Skip when the field's path already carries an error.
/// 4. Run each rule whose own clauses pass, in order, until the field has an
///    error or the run is fatally failed.
/// 5. Write an overridden value back through the field's setter.
pub struct PropertyRule<T, P> {
    field: Field<T, P>,
    value_mode: bool,
    clauses: Vec<Box<dyn Clause<T, P>>>,
    rules: Vec<RuleEntry<T, P>>,
}

impl<T: FieldValue, P: FieldValue> PropertyRule<T, P> {
    /// Starts a chain for `field`.
    pub fn builder(field: Field<T, P>) -> PropertyRuleBuilder<T, P> {
        PropertyRuleBuilder::new(field)
    }

    pub fn field(&self) -> &Field<T, P> {
        &self.field
    }

    /// Number of rules in the chain.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl<T, P> ValidatorRule<T> for PropertyRule<T, P>
where
    T: FieldValue,
    P: FieldValue,
{
    async fn run(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken) {
        if context.has_failed() {
            return;
        }
        if cancel.is_cancelled() {
            tracing::debug!(field = self.field.name(), "validation cancelled before field");
            context.cancel();
            return;
        }

        if !self.value_mode
            && let Some(selected) = context.selected_property()
            && selected != self.field.name()
            && selected != self.field.wire_name()
        {
            tracing::trace!(field = self.field.name(), selected, "field skipped: not selected");
            return;
        }

        let Some(entity) = context.value() else {
            return;
        };
        let value = self.field.get(entity).clone();

        let mut property = if self.value_mode {
            PropertyContext::for_value(context, value, self.field.text())
        } else {
            PropertyContext::for_field(context, &self.field, value)
        };

        if !self.clauses.iter().all(|clause| clause.check(&property)) {
            tracing::trace!(path = property.path(), "field skipped: clause not satisfied");
            return;
        }
        if property.has_error() {
            tracing::trace!(path = property.path(), "field skipped: error already recorded");
            return;
        }

        for entry in &self.rules {
            if cancel.is_cancelled() {
                tracing::debug!(path = property.path(), "validation cancelled within field");
                property.parent_mut().cancel();
                break;
            }
            if !entry.applies(&property) {
                continue;
            }

            property.set_error_text(entry.error_text.clone());
            if let Err(failure) = entry.rule.validate(&mut property, cancel).await {
                property.parent_mut().set_failure(failure);
            }

            if property.has_error() || property.parent().has_failed() {
                break;
            }
        }

        if let Some(value) = property.into_override()
            && let Some(entity) = context.value_mut()
        {
            self.field.set(entity, value);
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Fluent assembly of a [`PropertyRule`].
///
/// A clause added before the first rule gates the whole chain; added after a
/// rule, it gates only that rule. `error_text` likewise applies to the most
/// recently added rule.
///
/// ```rust,ignore
/// PropertyRule::builder(field!(Order, discount))
///     .when(|o: &Order| o.kind == Kind::Retail)   // whole chain
///     .mandatory()
///     .between(0, 50)
///     .when_operation([OperationType::Update])    // `between` only
///     .error_text("{0} is outside the allowed range.")
///     .build();
/// ```
#[must_use = "builder methods must be chained or built"]
pub struct PropertyRuleBuilder<T, P> {
    field: Field<T, P>,
    value_mode: bool,
    clauses: Vec<Box<dyn Clause<T, P>>>,
    rules: Vec<RuleEntry<T, P>>,
}

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    pub fn new(field: Field<T, P>) -> Self {
        Self {
            field,
            value_mode: false,
            clauses: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Appends a rule.
    pub fn rule(mut self, rule: impl Rule<T, P> + 'static) -> Self {
        self.rules.push(RuleEntry::new(rule));
        self
    }

    /// Adds a clause to the last rule, or to the chain when there is none.
    pub fn clause(mut self, clause: impl Clause<T, P> + 'static) -> Self {
        match self.rules.last_mut() {
            Some(entry) => entry.clauses.push(Box::new(clause)),
            None => self.clauses.push(Box::new(clause)),
        }
        self
    }

    /// Replaces the error text of the last rule.
    pub fn error_text(mut self, text: impl Into<LText>) -> Self {
        if let Some(entry) = self.rules.last_mut() {
            entry.error_text = Some(text.into());
        }
        self
    }

    /// Overrides the field's display text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.field = self.field.with_text(text);
        self
    }

    pub fn build(self) -> PropertyRule<T, P> {
        PropertyRule {
            field: self.field,
            value_mode: self.value_mode,
            clauses: self.clauses,
            rules: self.rules,
        }
    }
}

impl<P: FieldValue> PropertyRuleBuilder<P, P> {
    /// Chain over the context's value itself rather than one of its fields.
    pub fn for_value() -> Self {
        Self {
            value_mode: true,
            ..Self::new(Field::value())
        }
    }
}
