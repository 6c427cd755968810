//! Invocation wrapper
//!
//! Every validate call (root or nested) passes through the
//! [`ValidationInvoker`] held by the run's defaults snapshot. The wrapper sees
//! the run as an opaque future and can decorate it (diagnostics) or refuse it
//! (depth control) without rule code knowing.

use crate::error::ValidationFailure;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

// ============================================================================
// INVOCATION
// ============================================================================

/// Describes the run being invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Short name of the validator (usually the validated type).
    pub validator: &'static str,

    /// Reported path of the run; `None` at the root.
    pub path: Option<String>,

    /// Nesting depth; zero at the root.
    pub depth: usize,
}

/// Outcome counters of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub messages: usize,
    pub has_errors: bool,
    pub failed: bool,
}

// ============================================================================
// INVOKER TRAIT
// ============================================================================

/// Pluggable wrapper around every validate call.
///
/// An implementation must either drive `run` to completion and return its
/// summary, or return a failure without polling it. Returning a failure marks
/// the run as fatally failed.
#[async_trait]
pub trait ValidationInvoker: Send + Sync + fmt::Debug {
    async fn invoke<'a>(
        &self,
        invocation: Invocation,
        run: BoxFuture<'a, RunSummary>,
    ) -> Result<RunSummary, ValidationFailure>;
}

// ============================================================================
// TRACING INVOKER
// ============================================================================

/// Default invoker: runs inside a `validate` debug span and logs a summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInvoker;

#[async_trait]
impl ValidationInvoker for TracingInvoker {
    async fn invoke<'a>(
        &self,
        invocation: Invocation,
        run: BoxFuture<'a, RunSummary>,
    ) -> Result<RunSummary, ValidationFailure> {
        let span = tracing::debug_span!(
            "validate",
            validator = invocation.validator,
            path = invocation.path.as_deref().unwrap_or(""),
            depth = invocation.depth,
        );

        let start = Instant::now();
        let summary = run.instrument(span.clone()).await;
        let elapsed_us = start.elapsed().as_micros() as u64;

        span.in_scope(|| {
            tracing::debug!(
                messages = summary.messages,
                has_errors = summary.has_errors,
                failed = summary.failed,
                elapsed_us,
                "validation completed"
            );
        });

        Ok(summary)
    }
}

// ============================================================================
// DEPTH LIMIT INVOKER
// ============================================================================

/// Refuses invocations nested deeper than `max_depth`.
///
/// Guards against unbounded recursion through self-referencing validators.
#[derive(Debug, Clone)]
pub struct DepthLimitInvoker {
    max_depth: usize,
    inner: Arc<dyn ValidationInvoker>,
}

impl DepthLimitInvoker {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(max_depth: usize, inner: Arc<dyn ValidationInvoker>) -> Self {
        Self { max_depth, inner }
    }

    /// Configured maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[async_trait]
impl ValidationInvoker for DepthLimitInvoker {
    async fn invoke<'a>(
        &self,
        invocation: Invocation,
        run: BoxFuture<'a, RunSummary>,
    ) -> Result<RunSummary, ValidationFailure> {
        if invocation.depth > self.max_depth {
            tracing::debug!(
                depth = invocation.depth,
                max = self.max_depth,
                "validation depth exceeded"
            );
            return Err(ValidationFailure::DepthExceeded {
                depth: invocation.depth,
                max: self.max_depth,
            });
        }
        self.inner.invoke(invocation, run).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn invocation(depth: usize) -> Invocation {
        Invocation {
            validator: "Person",
            path: Some(String::from("people[0]")),
            depth,
        }
    }

    #[tokio::test]
    async fn test_tracing_invoker_runs_future() {
        let summary = RunSummary {
            messages: 2,
            has_errors: true,
            failed: false,
        };
        let result = TracingInvoker
            .invoke(invocation(0), Box::pin(async move { summary }))
            .await;
        assert_eq!(result.unwrap(), summary);
    }

    #[tokio::test]
    async fn test_depth_limit_refuses_without_polling() {
        let polled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&polled);
        let invoker = DepthLimitInvoker::new(1, Arc::new(TracingInvoker));

        let result = invoker
            .invoke(
                invocation(2),
                Box::pin(async move {
                    flag.store(true, Ordering::SeqCst);
                    RunSummary::default()
                }),
            )
            .await;

        assert!(matches!(
            result,
            Err(ValidationFailure::DepthExceeded { depth: 2, max: 1 })
        ));
        assert!(!polled.load(Ordering::SeqCst));
        assert!(invoker.invoke(invocation(1), Box::pin(async { RunSummary::default() })).await.is_ok());
    }
}
