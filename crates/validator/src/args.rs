//! Arguments for a validation run
//!
//! [`ValidationArgs`] is everything a caller (or a parent validator) can say
//! about a run besides the value itself: where it sits in the outer object
//! graph, which naming convention to report, whether to recurse, and which
//! configuration and defaults apply.

use crate::config::ValidationConfig;
use crate::settings::ValidationDefaults;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// OPERATION TYPE
// ============================================================================

/// Kind of operation the value is being validated for.
///
/// Rules can be gated on it with `when_operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationType {
    #[default]
    Unspecified,
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "Unspecified",
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
        };
        f.write_str(name)
    }
}

// ============================================================================
// VALIDATION ARGS
// ============================================================================

/// Per-run arguments.
///
/// # Examples
///
/// ```rust,ignore
/// let args = ValidationArgs::new()
///     .with_path("order.lines[2]", "order.lines[2]")
///     .with_operation(OperationType::Update)
///     .shallow();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationArgs {
    /// Only this top-level field is validated (native or wire name).
    pub selected_property: Option<String>,

    /// Native path prefix; `None` at the root.
    pub full_path: Option<String>,

    /// Wire path prefix; `None` at the root.
    pub wire_full_path: Option<String>,

    /// Report wire names; falls back to the defaults snapshot.
    pub use_wire_names: Option<bool>,

    /// Do not recurse into nested entities or collection items.
    pub shallow: bool,

    /// Configuration visible to rules.
    pub config: Option<ValidationConfig>,

    /// Operation being validated for.
    pub operation: OperationType,

    /// Friendly text of the host field, used by value-mode validators.
    pub text: Option<String>,

    /// Defaults snapshot; overrides the validator's own.
    pub defaults: Option<Arc<ValidationDefaults>>,

    pub(crate) depth: usize,
}

impl ValidationArgs {
    /// Empty arguments for a root run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the run to a single top-level field.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_selected_property(mut self, name: impl Into<String>) -> Self {
        self.selected_property = Some(name.into());
        self
    }

    /// Sets the native and wire path prefixes.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: impl Into<String>, wire_path: impl Into<String>) -> Self {
        self.full_path = Some(path.into());
        self.wire_full_path = Some(wire_path.into());
        self
    }

    /// Chooses between wire and native names for reported paths.
    #[must_use = "builder methods must be chained or built"]
    pub fn use_wire_names(mut self, use_wire_names: bool) -> Self {
        self.use_wire_names = Some(use_wire_names);
        self
    }

    /// Disables recursion into nested values.
    #[must_use = "builder methods must be chained or built"]
    pub fn shallow(mut self) -> Self {
        self.shallow = true;
        self
    }

    /// Attaches run configuration.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the operation kind.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_operation(mut self, operation: OperationType) -> Self {
        self.operation = operation;
        self
    }

    /// Sets the host field text.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Overrides the defaults snapshot for this run and everything below it.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_defaults(mut self, defaults: Arc<ValidationDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Nesting depth of the run; zero at the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}
