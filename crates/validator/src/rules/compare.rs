//! Comparison rules: constant and sibling comparisons, ranges, allowed sets.
//!
//! Every rule here works through [`Nested`], so `between(1, 10)` applies to
//! both `i32` and `Option<i32>` fields. Absent values are skipped.

use crate::context::PropertyContext;
use crate::error::ValidationFailure;
use crate::rule::{Field, PropertyRuleBuilder, Rule};
use crate::text::TextKey;
use crate::value::{FieldValue, Nested};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;

// ============================================================================
// OPERATOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl CompareOperator {
    /// Evaluates `left <op> right`.
    pub fn holds<Q: PartialOrd>(self, left: &Q, right: &Q) -> bool {
        match self {
            Self::Equal => left == right,
            Self::NotEqual => left != right,
            Self::LessThan => left < right,
            Self::LessThanEqual => left <= right,
            Self::GreaterThan => left > right,
            Self::GreaterThanEqual => left >= right,
        }
    }

    /// Message for a violation.
    pub fn text_key(self) -> TextKey {
        match self {
            Self::Equal => TextKey::CompareEqual,
            Self::NotEqual => TextKey::CompareNotEqual,
            Self::LessThan => TextKey::CompareLessThan,
            Self::LessThanEqual => TextKey::CompareLessThanEqual,
            Self::GreaterThan => TextKey::CompareGreaterThan,
            Self::GreaterThanEqual => TextKey::CompareGreaterThanEqual,
        }
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        };
        f.write_str(symbol)
    }
}

// ============================================================================
// COMPARE VALUE
// ============================================================================

/// Compares the value with a constant.
#[derive(Debug, Clone)]
pub struct Compare<Q> {
    operator: CompareOperator,
    value: Q,
}

impl<Q> Compare<Q> {
    pub fn new(operator: CompareOperator, value: Q) -> Self {
        Self { operator, value }
    }
}

#[async_trait]
impl<T, P, Q> Rule<T, P> for Compare<Q>
where
    T: FieldValue,
    P: Nested<Q>,
    Q: FieldValue + PartialOrd,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        let holds = match context.value().nested() {
            Some(value) => self.operator.holds(value, &self.value),
            None => return Ok(()),
        };
        if !holds {
            context.add_error(self.operator.text_key(), &[self.value.to_text()]);
        }
        Ok(())
    }
}

// ============================================================================
// COMPARE PROPERTY
// ============================================================================

/// Compares the value with a sibling field of the same type.
///
/// Skipped when either side is absent or the sibling already has an error.
pub struct CompareProperty<T, P, Q> {
    operator: CompareOperator,
    field: Field<T, P>,
    _nested: PhantomData<fn() -> Q>,
}

impl<T, P, Q> CompareProperty<T, P, Q> {
    pub fn new(operator: CompareOperator, field: Field<T, P>) -> Self {
        Self {
            operator,
            field,
            _nested: PhantomData,
        }
    }
}

#[async_trait]
impl<T, P, Q> Rule<T, P> for CompareProperty<T, P, Q>
where
    T: FieldValue,
    P: Nested<Q>,
    Q: FieldValue + PartialOrd,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if context.parent().has_error(&context.sibling_path(&self.field)) {
            return Ok(());
        }
        let Some(entity) = context.entity() else {
            return Ok(());
        };
        let (Some(value), Some(other)) = (context.value().nested(), self.field.get(entity).nested()) else {
            return Ok(());
        };

        if !self.operator.holds(value, other) {
            let text = self.field.display_text();
            context.add_error(self.operator.text_key(), &[text]);
        }
        Ok(())
    }
}

// ============================================================================
// BETWEEN
// ============================================================================

/// Range check, inclusive or exclusive at both ends.
#[derive(Debug, Clone)]
pub struct Between<Q> {
    from: Q,
    to: Q,
    exclusive: bool,
}

impl<Q> Between<Q> {
    pub fn inclusive(from: Q, to: Q) -> Self {
        Self {
            from,
            to,
            exclusive: false,
        }
    }

    pub fn exclusive(from: Q, to: Q) -> Self {
        Self {
            from,
            to,
            exclusive: true,
        }
    }
}

#[async_trait]
impl<T, P, Q> Rule<T, P> for Between<Q>
where
    T: FieldValue,
    P: Nested<Q>,
    Q: FieldValue + PartialOrd,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        let Some(value) = context.value().nested() else {
            return Ok(());
        };
        let within = if self.exclusive {
            *value > self.from && *value < self.to
        } else {
            *value >= self.from && *value <= self.to
        };

        if !within {
            let key = if self.exclusive {
                TextKey::BetweenExclusive
            } else {
                TextKey::BetweenInclusive
            };
            context.add_error(key, &[self.from.to_text(), self.to.to_text()]);
        }
        Ok(())
    }
}

// ============================================================================
// IS IN
// ============================================================================

/// The value must be one of an allowed set.
#[derive(Debug, Clone)]
pub struct IsIn<Q> {
    values: Vec<Q>,
}

impl<Q> IsIn<Q> {
    pub fn new(values: impl IntoIterator<Item = Q>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

#[async_trait]
impl<T, P, Q> Rule<T, P> for IsIn<Q>
where
    T: FieldValue,
    P: Nested<Q>,
    Q: FieldValue + PartialEq,
{
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        let allowed = match context.value().nested() {
            Some(value) => self.values.contains(value),
            None => return Ok(()),
        };
        if !allowed {
            context.add_error(TextKey::Invalid, &[]);
        }
        Ok(())
    }
}

// ============================================================================
// BUILDER SUGAR
// ============================================================================

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    pub fn compare<Q>(self, operator: CompareOperator, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.rule(Compare::new(operator, value))
    }

    pub fn equal<Q>(self, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.compare(CompareOperator::Equal, value)
    }

    pub fn not_equal<Q>(self, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.compare(CompareOperator::NotEqual, value)
    }

    pub fn less_than<Q>(self, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.compare(CompareOperator::LessThan, value)
    }

    pub fn less_than_equal<Q>(self, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.compare(CompareOperator::LessThanEqual, value)
    }

    pub fn greater_than<Q>(self, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.compare(CompareOperator::GreaterThan, value)
    }

    pub fn greater_than_equal<Q>(self, value: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.compare(CompareOperator::GreaterThanEqual, value)
    }

    /// Compares with a sibling field, e.g. `end >= start`.
    pub fn compare_property<Q>(self, operator: CompareOperator, field: &Field<T, P>) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.rule(CompareProperty::<T, P, Q>::new(operator, field.clone()))
    }

    pub fn between<Q>(self, from: Q, to: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.rule(Between::inclusive(from, to))
    }

    pub fn between_exclusive<Q>(self, from: Q, to: Q) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialOrd,
    {
        self.rule(Between::exclusive(from, to))
    }

    pub fn is_in<Q>(self, values: impl IntoIterator<Item = Q>) -> Self
    where
        P: Nested<Q>,
        Q: FieldValue + PartialEq,
    {
        self.rule(IsIn::new(values))
    }
}
