//! Clauses
//!
//! A clause is a synchronous gate evaluated before a rule (or a whole chain)
//! runs. A failing clause skips silently; it never records a message.

use crate::args::OperationType;
use crate::context::PropertyContext;
use crate::rule::{Field, PropertyRuleBuilder};
use crate::value::FieldValue;

/// Gate evaluated against a field's context.
pub trait Clause<T, P>: Send + Sync {
    fn check(&self, context: &PropertyContext<'_, T, P>) -> bool;
}

// ============================================================================
// BUILT-IN CLAUSES
// ============================================================================

/// Passes when a predicate over the owning entity holds.
pub struct When<F>(pub F);

impl<T, P, F> Clause<T, P> for When<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn check(&self, context: &PropertyContext<'_, T, P>) -> bool {
        context.entity().is_some_and(|entity| (self.0)(entity))
    }
}

/// Passes when a predicate over the field value holds.
pub struct WhenValue<F>(pub F);

impl<T, P, F> Clause<T, P> for WhenValue<F>
where
    T: FieldValue,
    P: FieldValue,
    F: Fn(&P) -> bool + Send + Sync,
{
    fn check(&self, context: &PropertyContext<'_, T, P>) -> bool {
        (self.0)(context.value())
    }
}

/// Passes when the field has a value.
pub struct WhenHasValue;

impl<T: FieldValue, P: FieldValue> Clause<T, P> for WhenHasValue {
    fn check(&self, context: &PropertyContext<'_, T, P>) -> bool {
        context.value().has_value()
    }
}

/// Passes when a sibling field has a value and no recorded error.
pub struct DependsOn<T, Q> {
    field: Field<T, Q>,
}

impl<T: FieldValue, Q: FieldValue> DependsOn<T, Q> {
    pub fn new(field: Field<T, Q>) -> Self {
        Self { field }
    }
}

impl<T, P, Q> Clause<T, P> for DependsOn<T, Q>
where
    T: FieldValue,
    P: FieldValue,
    Q: FieldValue,
{
    fn check(&self, context: &PropertyContext<'_, T, P>) -> bool {
        let has_value = context
            .entity()
            .is_some_and(|entity| self.field.get(entity).has_value());
        has_value && !context.parent().has_error(&context.sibling_path(&self.field))
    }
}

/// Passes when the run's operation is one of the listed kinds.
pub struct WhenOperation(Vec<OperationType>);

impl WhenOperation {
    pub fn new(operations: impl IntoIterator<Item = OperationType>) -> Self {
        Self(operations.into_iter().collect())
    }
}

impl<T: FieldValue, P: FieldValue> Clause<T, P> for WhenOperation {
    fn check(&self, context: &PropertyContext<'_, T, P>) -> bool {
        self.0.contains(&context.parent().operation())
    }
}

// ============================================================================
// BUILDER SUGAR
// ============================================================================

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    /// Gate on the owning entity.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.clause(When(predicate))
    }

    /// Gate on the field value.
    pub fn when_value<F>(self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.clause(WhenValue(predicate))
    }

    /// Gate on the field having a value.
    pub fn when_has_value(self) -> Self {
        self.clause(WhenHasValue)
    }

    /// Gate on a sibling field being present and valid so far.
    pub fn depends_on<Q: FieldValue>(self, field: &Field<T, Q>) -> Self {
        self.clause(DependsOn::new(field.clone()))
    }

    /// Gate on the operation kind.
    pub fn when_operation(self, operations: impl IntoIterator<Item = OperationType>) -> Self {
        self.clause(WhenOperation::new(operations))
    }
}
