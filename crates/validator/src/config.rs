//! Layered run configuration
//!
//! Free-form key/value data made available to rules during a run, e.g. a
//! tenant identifier that changes what "valid" means. Values are stored as
//! `Any` and read back by type.
//!
//! Configuration is inherited by nested runs but never leaks upward: a child
//! that adds entries gets its own layer on top of the shared parent layer, so
//! the parent's map is never mutated from below.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
struct Layer {
    data: HashMap<String, Arc<dyn Any + Send + Sync>>,
    parent: Option<Arc<Layer>>,
}

impl Layer {
    fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        match self.data.get(key) {
            Some(value) => Some(value.as_ref()),
            None => self.parent.as_ref().and_then(|p| p.get(key)),
        }
    }

    fn keys(&self, out: &mut Vec<String>) {
        if let Some(parent) = &self.parent {
            parent.keys(out);
        }
        for key in self.data.keys() {
            if !out.contains(key) {
                out.push(key.clone());
            }
        }
    }
}

// ============================================================================
// VALIDATION CONFIG
// ============================================================================

/// Inherited, read-only-from-below configuration map.
///
/// # Examples
///
/// ```rust,ignore
/// let config = ValidationConfig::new().with("tenant", String::from("acme"));
///
/// let mut child = config.child();
/// child.insert("strict", true);
///
/// assert_eq!(child.get::<String>("tenant").map(String::as_str), Some("acme"));
/// assert!(config.get::<bool>("strict").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ValidationConfig {
    layer: Arc<Layer>,
}

impl ValidationConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    #[must_use = "builder methods must be chained or built"]
    pub fn with<V: Send + Sync + 'static>(mut self, key: impl Into<String>, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds an entry.
    ///
    /// When this layer is shared with another context a new layer is pushed
    /// first, so the insertion is only visible through `self`.
    pub fn insert<V: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let value: Arc<dyn Any + Send + Sync> = Arc::new(value);

        if let Some(layer) = Arc::get_mut(&mut self.layer) {
            layer.data.insert(key, value);
            return;
        }

        let parent = Arc::clone(&self.layer);
        self.layer = Arc::new(Layer {
            data: HashMap::from([(key, value)]),
            parent: Some(parent),
        });
    }

    /// Reads an entry of type `V`, searching parent layers.
    #[must_use]
    pub fn get<V: 'static>(&self, key: &str) -> Option<&V> {
        self.layer.get(key).and_then(|value| value.downcast_ref::<V>())
    }

    /// Returns true if any layer holds `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.layer.get(key).is_some()
    }

    /// Creates the view handed to a nested run.
    #[must_use]
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// All visible keys, parent layers first.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.layer.keys(&mut out);
        out
    }

    /// Returns true when no layer holds any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

impl fmt::Debug for ValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationConfig")
            .field("keys", &self.keys())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
