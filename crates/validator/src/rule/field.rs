use crate::context::VALUE_NAME;
use crate::text::{to_camel_case, to_sentence_case};
use crate::value::FieldValue;
use std::fmt;
use std::sync::Arc;

/// Registration-time binding of one field of `T` with type `P`.
///
/// Carries the native name, the wire (JSON) name, optional display text and
/// the accessor pair. No reflection happens at validate time.
///
/// ```rust,ignore
/// let name = Field::new("first_name", |p: &Person| &p.first_name)
///     .with_setter(|p: &mut Person, v| p.first_name = v)
///     .with_text("Given name");
///
/// // or, for the common case
/// let name = field!(Person, first_name);
/// ```
pub struct Field<T, P> {
    name: String,
    wire_name: String,
    text: Option<String>,
    getter: Arc<dyn Fn(&T) -> &P + Send + Sync>,
    setter: Option<Arc<dyn Fn(&mut T, P) + Send + Sync>>,
}

impl<T, P> Field<T, P>
where
    T: FieldValue,
    P: FieldValue,
{
    /// Binds a read-only field. The wire name defaults to lower camelCase.
    pub fn new<G>(name: impl Into<String>, getter: G) -> Self
    where
        G: Fn(&T) -> &P + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            wire_name: to_camel_case(&name),
            name,
            text: None,
            getter: Arc::new(getter),
            setter: None,
        }
    }

    /// Adds a setter so value overrides are written back into the entity.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    /// Overrides the sentence-cased display text.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Explicit display text, if one was set.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Display text: the explicit text or the sentence-cased name.
    pub fn display_text(&self) -> String {
        self.text.clone().unwrap_or_else(|| to_sentence_case(&self.name))
    }

    /// Reads the field from `entity`.
    pub fn get<'e>(&self, entity: &'e T) -> &'e P {
        (self.getter)(entity)
    }

    /// Writes `value` into `entity`; returns false when the field has no setter.
    pub fn set(&self, entity: &mut T, value: P) -> bool {
        match &self.setter {
            Some(setter) => {
                setter(entity, value);
                true
            }
            None => false,
        }
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}

impl<P: FieldValue> Field<P, P> {
    /// Binding for a value validated as a whole (value mode).
    pub fn value() -> Self {
        fn identity<P>(value: &P) -> &P {
            value
        }
        fn replace<P>(slot: &mut P, value: P) {
            *slot = value;
        }

        Self::new(VALUE_NAME, identity::<P>).with_setter(replace::<P>)
    }
}

impl<T, P> Clone for Field<T, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            wire_name: self.wire_name.clone(),
            text: self.text.clone(),
            getter: Arc::clone(&self.getter),
            setter: self.setter.clone(),
        }
    }
}

impl<T, P> fmt::Debug for Field<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("text", &self.text)
            .field("has_setter", &self.setter.is_some())
            .finish()
    }
}
