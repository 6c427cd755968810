use super::{join_path, VALUE_NAME};
use crate::args::{OperationType, ValidationArgs};
use crate::config::ValidationConfig;
use crate::error::{Error, Result, ValidationError, ValidationFailure};
use crate::invoker::RunSummary;
use crate::message::{Message, MessageType, Messages};
use crate::settings::ValidationDefaults;
use crate::text::{format_text, to_camel_case, LText};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// VALIDATION OUTCOME
// ============================================================================

/// The type-erased part of a finished run: its messages and fatal failure.
///
/// This is what a parent merges from a nested run, whatever the nested value
/// type was.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub messages: Messages,
    pub failure: Option<ValidationFailure>,
}

impl ValidationOutcome {
    /// Returns true if any error message was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.messages.has_errors()
    }
}

impl<T> From<ValidationContext<T>> for ValidationOutcome {
    fn from(context: ValidationContext<T>) -> Self {
        Self {
            messages: context.messages,
            failure: context.failure,
        }
    }
}

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// State of one validation run over a value of type `T`.
///
/// Created right before a validator runs and handed back to the caller when
/// it finishes. Nested values get their own transient context which is merged
/// into this one.
pub struct ValidationContext<T> {
    value: Option<T>,
    path: Option<String>,
    wire_path: Option<String>,
    use_wire_names: bool,
    selected_property: Option<String>,
    shallow: bool,
    operation: OperationType,
    text: Option<String>,
    config: ValidationConfig,
    messages: Messages,
    // reported path -> index of the first error message for it
    path_index: HashMap<String, usize>,
    failure: Option<ValidationFailure>,
    defaults: Arc<ValidationDefaults>,
    depth: usize,
}

impl<T> ValidationContext<T> {
    /// Creates the context for a run.
    ///
    /// `defaults` is the validator's snapshot; `args.defaults` wins over it.
    pub fn new(value: Option<T>, args: ValidationArgs, defaults: Arc<ValidationDefaults>) -> Self {
        let defaults = args.defaults.unwrap_or(defaults);
        Self {
            value,
            use_wire_names: args.use_wire_names.unwrap_or(defaults.use_wire_names),
            path: args.full_path,
            wire_path: args.wire_full_path,
            selected_property: args.selected_property,
            shallow: args.shallow,
            operation: args.operation,
            text: args.text,
            config: args.config.unwrap_or_default(),
            messages: Messages::new(),
            path_index: HashMap::new(),
            failure: None,
            defaults,
            depth: args.depth,
        }
    }

    /// Root context over `value` with default arguments.
    pub fn for_value(value: T) -> Self {
        Self::new(
            Some(value),
            ValidationArgs::default(),
            Arc::new(ValidationDefaults::default()),
        )
    }

    // ------------------------------------------------------------------------
    // Subject
    // ------------------------------------------------------------------------

    /// The value under validation.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Mutable access, used to write back overridden field values.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Consumes the context and returns the (possibly updated) value.
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    // ------------------------------------------------------------------------
    // Run options
    // ------------------------------------------------------------------------

    /// Reported path prefix (wire or native per [`uses_wire_names`](Self::uses_wire_names)).
    pub fn path(&self) -> Option<&str> {
        if self.use_wire_names {
            self.wire_path.as_deref()
        } else {
            self.path.as_deref()
        }
    }

    /// Native path prefix.
    pub fn native_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Wire path prefix.
    pub fn wire_path(&self) -> Option<&str> {
        self.wire_path.as_deref()
    }

    /// Reported path of the value itself, `value` when at the root.
    pub fn value_path(&self) -> String {
        self.path().unwrap_or(VALUE_NAME).to_owned()
    }

    pub fn uses_wire_names(&self) -> bool {
        self.use_wire_names
    }

    pub fn selected_property(&self) -> Option<&str> {
        self.selected_property.as_deref()
    }

    pub fn is_shallow(&self) -> bool {
        self.shallow
    }

    pub fn operation(&self) -> OperationType {
        self.operation
    }

    /// Friendly text of the host field, when run on behalf of one.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Mutable configuration; additions are visible to this run and below.
    pub fn config_mut(&mut self) -> &mut ValidationConfig {
        &mut self.config
    }

    pub fn defaults(&self) -> &Arc<ValidationDefaults> {
        &self.defaults
    }

    /// Nesting depth; zero at the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// True once any error message has been recorded.
    pub fn has_errors(&self) -> bool {
        self.messages.has_errors()
    }

    /// True if an error has been recorded against exactly `path`.
    pub fn has_error(&self, path: &str) -> bool {
        self.path_index.contains_key(path)
    }

    /// First error recorded against `path`.
    pub fn error_for(&self, path: &str) -> Option<&Message> {
        self.path_index
            .get(path)
            .and_then(|index| self.messages.as_slice().get(*index))
    }

    /// Appends a message, indexing the first error per path.
    pub fn add_message(&mut self, message: Message) {
        if message.is_error()
            && let Some(property) = &message.property
            && !self.path_index.contains_key(property)
        {
            self.path_index.insert(property.clone(), self.messages.len());
        }
        self.messages.push(message);
    }

    /// Records an error against a named field of this value.
    ///
    /// Intended for whole-entity hooks; the reported path follows the same
    /// native/wire convention as rule chains.
    pub fn add_property_error(&mut self, name: &str, text: impl Into<String>) {
        let path = self.property_path(name);
        self.add_message(Message::error(text).with_property(path));
    }

    /// Reported path of a direct field of this value.
    pub fn property_path(&self, name: &str) -> String {
        if self.use_wire_names {
            join_path(self.wire_path.as_deref(), &to_camel_case(name))
        } else {
            join_path(self.path.as_deref(), name)
        }
    }

    /// Resolves `text` through the text provider and formats it.
    pub fn format(&self, text: &LText, args: &[String]) -> String {
        let template = text.resolve(self.defaults.text_provider.as_ref());
        format_text(&template, args)
    }

    // ------------------------------------------------------------------------
    // Fatal failure
    // ------------------------------------------------------------------------

    pub fn failure(&self) -> Option<&ValidationFailure> {
        self.failure.as_ref()
    }

    /// True once the run is in the fatal state.
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Enters the fatal state. The first failure wins.
    pub fn set_failure(&mut self, failure: ValidationFailure) {
        if self.failure.is_some() {
            return;
        }
        tracing::debug!(
            path = self.path().unwrap_or(""),
            failure = %failure,
            "validation entered fatal state"
        );
        self.failure = Some(failure);
    }

    /// Records a cancellation observed by the engine.
    pub fn cancel(&mut self) {
        self.set_failure(ValidationFailure::Cancelled);
    }

    // ------------------------------------------------------------------------
    // Nesting
    // ------------------------------------------------------------------------

    /// Merges a nested run: its messages are appended and its failure, if
    /// any, becomes this run's failure.
    pub fn merge(&mut self, outcome: impl Into<ValidationOutcome>) {
        let outcome = outcome.into();
        for message in outcome.messages {
            self.add_message(message);
        }
        if let Some(failure) = outcome.failure {
            self.set_failure(failure);
        }
    }

    /// Arguments for a nested run below this one.
    pub(crate) fn child_args(&self, path: String, wire_path: String, text: Option<String>) -> ValidationArgs {
        ValidationArgs {
            selected_property: None,
            full_path: Some(path),
            wire_full_path: Some(wire_path),
            use_wire_names: Some(self.use_wire_names),
            shallow: self.shallow,
            config: Some(self.config.child()),
            operation: self.operation,
            text,
            defaults: Some(Arc::clone(&self.defaults)),
            depth: self.depth + 1,
        }
    }

    /// Same-level context over another view of the value (base inclusion).
    ///
    /// Shares path, options and the error index so the included rules see
    /// errors already recorded here.
    pub(crate) fn rehome<B>(&self, value: B) -> ValidationContext<B> {
        ValidationContext {
            value: Some(value),
            path: self.path.clone(),
            wire_path: self.wire_path.clone(),
            use_wire_names: self.use_wire_names,
            selected_property: self.selected_property.clone(),
            shallow: self.shallow,
            operation: self.operation,
            text: self.text.clone(),
            config: self.config.child(),
            messages: Messages::new(),
            path_index: HashMap::new(),
            failure: None,
            defaults: Arc::clone(&self.defaults),
            depth: self.depth,
        }
        .with_index_from(&self.path_index)
    }

    fn with_index_from(mut self, index: &HashMap<String, usize>) -> Self {
        // Foreign indexes point into another message list; keep the keys only
        // as existence markers.
        self.path_index = index.keys().map(|k| (k.clone(), usize::MAX)).collect();
        self
    }

    /// Folds a rehomed context back in and returns its value.
    pub(crate) fn restore<B>(&mut self, child: ValidationContext<B>) -> Option<B> {
        let ValidationContext {
            value,
            messages,
            failure,
            ..
        } = child;
        self.merge(ValidationOutcome { messages, failure });
        value
    }

    pub(crate) fn summary(&self) -> RunSummary {
        RunSummary {
            messages: self.messages.len(),
            has_errors: self.has_errors(),
            failed: self.has_failed(),
        }
    }

    // ------------------------------------------------------------------------
    // Result surface
    // ------------------------------------------------------------------------

    /// The error describing this run, if it did not succeed.
    ///
    /// A fatal failure takes precedence over ordinary messages.
    pub fn to_error(&self) -> Option<Error> {
        if let Some(failure) = &self.failure {
            return Some(Error::Failure(failure.clone()));
        }
        self.has_errors()
            .then(|| Error::Validation(ValidationError::from_messages(&self.messages, false)))
    }

    /// Returns `self` when the run succeeded, the error otherwise.
    ///
    /// With `include_warnings`, warnings alone also fail the run and are
    /// carried in the error.
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

    /// Converts a successful run into its value.
    pub fn into_result<R: From<T>>(self) -> Result<R> {
        let context = self.ensure_ok(false)?;
        context
            .value
            .map(R::from)
            .ok_or_else(|| ValidationFailure::rule("validation produced no value").into())
    }
}

impl<T: fmt::Debug> fmt::Debug for ValidationContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("value", &self.value)
            .field("path", &self.path)
            .field("wire_path", &self.wire_path)
            .field("use_wire_names", &self.use_wire_names)
            .field("messages", &self.messages)
            .field("failure", &self.failure)
            .field("depth", &self.depth)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
