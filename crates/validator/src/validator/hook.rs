use crate::context::ValidationContext;
use crate::error::ValidationFailure;
use crate::value::FieldValue;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Whole-entity logic run after the field chains.
///
/// Hooks see the full context: they can inspect the value, look at errors
/// already recorded and add their own with
/// [`add_property_error`](ValidationContext::add_property_error). Returning
/// `Err` puts the run into the fatal state.
///
/// Plain closures implement this trait:
///
/// ```rust,ignore
/// builder.on_validate(|ctx: &mut ValidationContext<Booking>| {
///     if let Some(b) = ctx.value() && b.end < b.start {
///         ctx.add_property_error("end", "End must not be before Start.");
///     }
///     Ok(())
/// })
/// ```
///
/// Asynchronous hooks implement it on their own type.
#[async_trait]
pub trait EntityHook<T>: Send + Sync {
    async fn call(
        &self,
        context: &mut ValidationContext<T>,
        cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure>;
}

#[async_trait]
impl<T, F> EntityHook<T> for F
where
    T: FieldValue,
    F: Fn(&mut ValidationContext<T>) -> Result<(), ValidationFailure> + Send + Sync,
{
    async fn call(
        &self,
        context: &mut ValidationContext<T>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        self(context)
    }
}

/// Runs `hook` unless the run is already fatally failed.
pub(crate) async fn run_hook<T: FieldValue>(
    hook: &dyn EntityHook<T>,
    context: &mut ValidationContext<T>,
    cancel: &CancellationToken,
) {
    if cancel.is_cancelled() {
        tracing::debug!("validation cancelled before hook");
        context.cancel();
    }
    if context.has_failed() {
        return;
    }
    if let Err(failure) = hook.call(context, cancel).await {
        context.set_failure(failure);
    }
}
