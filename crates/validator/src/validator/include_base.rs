use super::EntityValidator;
use crate::context::ValidationContext;
use crate::error::ValidationFailure;
use crate::rule::ValidatorRule;
use crate::value::{FieldValue, Inherits};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs an ancestor validator's rules against the [`Inherits`] view of the
/// value, at the same path level.
///
/// The base validator's field chains and `on_validate` hook run; its
/// `additional` hook does not. Values the base rules override are written back
/// through [`Inherits::base_mut`].
pub struct IncludeBase<T, B> {
    base: Arc<EntityValidator<B>>,
    _entity: PhantomData<fn(&T)>,
}

impl<T, B> IncludeBase<T, B>
where
    T: Inherits<B>,
    B: FieldValue,
{
    pub fn new(base: Arc<EntityValidator<B>>) -> Self {
        Self {
            base,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T, B> ValidatorRule<T> for IncludeBase<T, B>
where
    T: Inherits<B>,
    B: FieldValue,
{
    async fn run(&self, context: &mut ValidationContext<T>, cancel: &CancellationToken) {
        let Some(entity) = context.value() else {
            return;
        };
        let Some(view) = Inherits::<B>::base(entity).cloned() else {
            context.set_failure(ValidationFailure::IncompatibleBase {
                base: std::any::type_name::<B>(),
            });
            return;
        };

        let mut base_context = context.rehome(view);
        self.base.run_rules(&mut base_context, cancel).await;

        if let Some(updated) = context.restore(base_context)
            && let Some(slot) = context.value_mut().and_then(|entity| Inherits::<B>::base_mut(entity))
        {
            *slot = updated;
        }
    }
}
