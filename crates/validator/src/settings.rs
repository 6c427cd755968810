//! Settings and resolved defaults
//!
//! [`ValidationSettings`] is the serde-facing configuration a host loads at
//! startup. [`ValidationDefaults`] is the resolved snapshot validators capture
//! when they are built. The engine reads nothing else: there are no
//! process-wide mutable globals.

use crate::error::ConfigError;
use crate::invoker::{DepthLimitInvoker, TracingInvoker, ValidationInvoker};
use crate::text::{DefaultTextProvider, TextKey, TextProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// SETTINGS
// ============================================================================

/// Deserializable validation settings.
///
/// Every field is optional in the source document.
///
/// ```rust,ignore
/// let settings: ValidationSettings = serde_json::from_str(r#"{
///     "use_wire_names": false,
///     "max_depth": 16,
///     "texts": { "validation.mandatory": "{0} must be provided." }
/// }"#)?;
/// let defaults = ValidationDefaults::from_settings(&settings)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Report wire (JSON) names instead of native names.
    pub use_wire_names: bool,

    /// Maximum nesting depth of validator invocations.
    pub max_depth: Option<usize>,

    /// Format-string overrides keyed by text identifier.
    pub texts: HashMap<String, String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            use_wire_names: true,
            max_depth: None,
            texts: HashMap::new(),
        }
    }
}

// ============================================================================
// DEFAULTS SNAPSHOT
// ============================================================================

/// Resolved defaults captured by a validator at build time.
#[derive(Debug, Clone)]
pub struct ValidationDefaults {
    /// Report wire names unless a run says otherwise.
    pub use_wire_names: bool,

    /// Format-string lookup for built-in rules.
    pub text_provider: Arc<dyn TextProvider>,

    /// Wrapper every validate call passes through.
    pub invoker: Arc<dyn ValidationInvoker>,
}

impl Default for ValidationDefaults {
    fn default() -> Self {
        Self {
            use_wire_names: true,
            text_provider: Arc::new(DefaultTextProvider::new()),
            invoker: Arc::new(TracingInvoker),
        }
    }
}

impl ValidationDefaults {
    /// Resolves settings into a snapshot.
    ///
    /// Unknown text identifiers are rejected so typos surface at startup.
    pub fn from_settings(settings: &ValidationSettings) -> Result<Self, ConfigError> {
        let mut provider = DefaultTextProvider::new();
        for (id, text) in &settings.texts {
            let key = TextKey::from_id(id).ok_or_else(|| ConfigError::UnknownTextKey { id: id.clone() })?;
            provider = provider.with_override(key, text.clone());
        }

        let invoker: Arc<dyn ValidationInvoker> = match settings.max_depth {
            Some(max_depth) => Arc::new(DepthLimitInvoker::new(max_depth, Arc::new(TracingInvoker))),
            None => Arc::new(TracingInvoker),
        };

        Ok(Self {
            use_wire_names: settings.use_wire_names,
            text_provider: Arc::new(provider),
            invoker,
        })
    }

    /// Replaces the text provider.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_text_provider(mut self, provider: impl TextProvider + 'static) -> Self {
        self.text_provider = Arc::new(provider);
        self
    }

    /// Replaces the invoker.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_invoker(mut self, invoker: impl ValidationInvoker + 'static) -> Self {
        self.invoker = Arc::new(invoker);
        self
    }

    /// Sets the wire-name default.
    #[must_use = "builder methods must be chained or built"]
    pub fn use_wire_names(mut self, use_wire_names: bool) -> Self {
        self.use_wire_names = use_wire_names;
        self
    }
}
