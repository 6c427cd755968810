//! Error types
//!
//! Validation has two disjoint failure channels:
//!
//! - [`ValidationError`] — the structured exception over the accumulated
//!   message list, raised only when a caller asks for it.
//! - [`ValidationFailure`] — a fatal, terminal state of a run (cancellation,
//!   base-inclusion mismatch, exceeded nesting depth, a rule that could not
//!   complete). It suppresses all further rule execution.
//!
//! Construction-time misuse that the type system cannot rule out is reported
//! through [`ConfigError`] when a validator is built.

use crate::message::{Message, MessageType, Messages};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Structured validation exception carrying the full message list.
///
/// This is the only error the engine itself raises for ordinary validation
/// outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    messages: Messages,
}

impl ValidationError {
    /// Default summary line.
    pub const SUMMARY: &'static str = "A data validation error occurred.";

    /// Wraps a message list.
    #[must_use]
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    /// Builds an exception from error messages only, optionally keeping
    /// warnings.
    #[must_use]
    pub fn from_messages(messages: &Messages, include_warnings: bool) -> Self {
        let messages = messages
            .iter()
            .filter(|m| {
                m.kind == MessageType::Error || (include_warnings && m.kind == MessageType::Warning)
            })
            .cloned()
            .collect();
        Self { messages }
    }

    /// The wrapped messages.
    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Consumes the error and returns the messages.
    #[must_use]
    pub fn into_messages(self) -> Messages {
        self.messages
    }

    /// First message recorded against `property`, if any.
    #[must_use]
    pub fn message_for<'a>(&'a self, property: &'a str) -> Option<&'a Message> {
        self.messages.for_property(property).next()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::SUMMARY)?;
        for message in &self.messages {
            write!(f, "\n  {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// VALIDATION FAILURE
// ============================================================================

/// A fatal failure of a validation run.
///
/// Once recorded on a context no further rule chains execute at that level or
/// above, and the failure is surfaced to the caller instead of the messages.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationFailure {
    /// The cancellation token was triggered while the run was in progress.
    #[error("validation was cancelled")]
    Cancelled,

    /// A value could not be viewed as the ancestor shape of an included base
    /// validator.
    #[error("value cannot be viewed as base type `{base}`")]
    IncompatibleBase { base: &'static str },

    /// Nested validation went deeper than the invoker allows.
    #[error("validation nesting depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    /// A rule or hook could not complete.
    #[error("{message}")]
    Rule { message: String },

    /// An external lookup used by a rule failed.
    #[error("external check failed: {0}")]
    External(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl ValidationFailure {
    /// Creates a [`ValidationFailure::Rule`].
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule {
            message: message.into(),
        }
    }

    /// Wraps an external error.
    pub fn external(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::External(Arc::new(error))
    }

    /// Returns true for [`ValidationFailure::Cancelled`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

/// Misconfiguration detected while building a validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Minimum count is greater than the maximum count.
    #[error("minimum count {min} is greater than maximum count {max}")]
    InvalidCountRange { min: usize, max: usize },

    /// A pattern could not be compiled.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A text override names an identifier no rule uses.
    #[error("unknown text identifier `{id}`")]
    UnknownTextKey { id: String },
}

// ============================================================================
// UMBRELLA ERROR
// ============================================================================

/// Either outcome channel of a completed run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Ordinary validation errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Fatal failure of the run.
    #[error(transparent)]
    Failure(#[from] ValidationFailure),
}

impl Error {
    /// The validation error, when this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Failure(_) => None,
        }
    }

    /// The fatal failure, when this is one.
    #[must_use]
    pub fn as_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Validation(_) => None,
        }
    }
}

/// Result alias over [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// TESTS
// ============================================================================
