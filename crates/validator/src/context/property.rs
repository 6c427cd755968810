use super::{join_path, last_segment, ValidationContext, ValidationOutcome, VALUE_NAME};
use crate::args::ValidationArgs;
use crate::message::{Message, MessageType};
use crate::rule::Field;
use crate::text::{to_sentence_case, LText};
use crate::value::FieldValue;

/// Context for one field while its rule chain runs.
///
/// Holds a copy of the field's current value; rules may replace it with
/// [`set_value`](Self::set_value), and the chain writes the final value back
/// into the entity through the field's setter.
pub struct PropertyContext<'a, T, P> {
    parent: &'a mut ValidationContext<T>,
    name: String,
    wire_name: String,
    text: String,
    text_overridden: bool,
    full_path: String,
    wire_full_path: String,
    value: P,
    overridden: bool,
    has_error: bool,
    error_text: Option<LText>,
}

impl<'a, T, P> PropertyContext<'a, T, P>
where
    T: FieldValue,
    P: FieldValue,
{
    /// Context for a named field of the parent's value.
    pub(crate) fn for_field(parent: &'a mut ValidationContext<T>, field: &Field<T, P>, value: P) -> Self {
        let full_path = join_path(parent.native_path(), field.name());
        let wire_full_path = join_path(parent.wire_path(), field.wire_name());
        let mut context = Self {
            name: field.name().to_owned(),
            wire_name: field.wire_name().to_owned(),
            text: field.display_text(),
            text_overridden: field.text().is_some(),
            full_path,
            wire_full_path,
            value,
            overridden: false,
            has_error: false,
            error_text: None,
            parent,
        };
        context.has_error = context.parent.has_error(context.path());
        context
    }

    /// Context where the parent's value is itself the subject.
    ///
    /// The path is the parent path verbatim and the name is its last segment.
    /// Text comes from `text`, else the host text passed down by the caller,
    /// else the sentence-cased name.
    pub(crate) fn for_value(parent: &'a mut ValidationContext<T>, value: P, text: Option<&str>) -> Self {
        let full_path = parent.native_path().unwrap_or(VALUE_NAME).to_owned();
        let wire_full_path = parent.wire_path().unwrap_or(VALUE_NAME).to_owned();
        let name = last_segment(&full_path).to_owned();
        let wire_name = last_segment(&wire_full_path).to_owned();
        let (text, text_overridden) = match (text, parent.text()) {
            (Some(text), _) => (text.to_owned(), true),
            (None, Some(host)) => (host.to_owned(), false),
            (None, None) => (to_sentence_case(&name), false),
        };

        let mut context = Self {
            name,
            wire_name,
            text,
            text_overridden,
            full_path,
            wire_full_path,
            value,
            overridden: false,
            has_error: false,
            error_text: None,
            parent,
        };
        context.has_error = context.parent.has_error(context.path());
        context
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn parent(&self) -> &ValidationContext<T> {
        &*self.parent
    }

    pub fn parent_mut(&mut self) -> &mut ValidationContext<T> {
        &mut *self.parent
    }

    /// The entity owning the field.
    pub fn entity(&self) -> Option<&T> {
        self.parent.value()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Friendly text used as `{0}` in messages.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the text was set explicitly rather than derived.
    pub fn is_text_overridden(&self) -> bool {
        self.text_overridden
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn wire_full_path(&self) -> &str {
        &self.wire_full_path
    }

    /// Path reported in messages.
    pub fn path(&self) -> &str {
        if self.parent.uses_wire_names() {
            &self.wire_full_path
        } else {
            &self.full_path
        }
    }

    /// Reported path of a sibling field.
    pub fn sibling_path<Q: FieldValue>(&self, field: &Field<T, Q>) -> String {
        if self.parent.uses_wire_names() {
            join_path(self.parent.wire_path(), field.wire_name())
        } else {
            join_path(self.parent.native_path(), field.name())
        }
    }

    pub fn value(&self) -> &P {
        &self.value
    }

    /// Replaces the field value for later rules and for write-back.
    pub fn set_value(&mut self, value: P) {
        self.value = value;
        self.overridden = true;
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// True once an error has been recorded against this field's path.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Formats and records a message against this field.
    ///
    /// `{0}` is the field text, `{1}` the field value, `args` follow from `{2}`.
    /// An error text configured on the running rule replaces `text` for
    /// errors.
    pub fn add_message(&mut self, kind: MessageType, text: impl Into<LText>, args: &[String]) {
        let text = match (&self.error_text, kind) {
            (Some(error_text), MessageType::Error) => error_text.clone(),
            _ => text.into(),
        };

        let mut all = Vec::with_capacity(args.len() + 2);
        all.push(self.text.clone());
        all.push(self.value.to_text());
        all.extend_from_slice(args);

        let rendered = self.parent.format(&text, &all);
        let message = Message::new(kind, rendered).with_property(self.path());
        self.parent.add_message(message);

        if kind == MessageType::Error {
            self.has_error = true;
        }
    }

    pub fn add_error(&mut self, text: impl Into<LText>, args: &[String]) {
        self.add_message(MessageType::Error, text, args);
    }

    pub fn add_warning(&mut self, text: impl Into<LText>, args: &[String]) {
        self.add_message(MessageType::Warning, text, args);
    }

    pub fn add_info(&mut self, text: impl Into<LText>, args: &[String]) {
        self.add_message(MessageType::Info, text, args);
    }

    // ------------------------------------------------------------------------
    // Nesting
    // ------------------------------------------------------------------------

    /// Arguments for a nested run rooted at this field.
    pub fn child_args(&self) -> ValidationArgs {
        self.parent.child_args(
            self.full_path.clone(),
            self.wire_full_path.clone(),
            Some(self.text.clone()),
        )
    }

    /// Merges a nested run and refreshes the field's error flag.
    pub fn merge(&mut self, outcome: impl Into<ValidationOutcome>) {
        self.parent.merge(outcome);
        if !self.has_error {
            self.has_error = self.parent.has_error(self.path());
        }
    }

    pub(crate) fn set_error_text(&mut self, text: Option<LText>) {
        self.error_text = text;
    }

    /// Ends the field and yields the overridden value, if any.
    pub(crate) fn into_override(self) -> Option<P> {
        self.overridden.then_some(self.value)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ValidationDefaults;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct Person {
        first_name: String,
    }

    impl FieldValue for Person {}

    fn first_name() -> Field<Person, String> {
        Field::new("first_name", |p: &Person| &p.first_name)
    }

    fn context(args: ValidationArgs) -> ValidationContext<Person> {
        ValidationContext::new(
            Some(Person {
                first_name: String::from("Ada"),
            }),
            args,
            Arc::new(ValidationDefaults::default()),
        )
    }

    #[test]
    fn test_field_paths() {
        let mut parent = context(ValidationArgs::new().with_path("People[1]", "people[1]"));
        let field = first_name();
        let pc = PropertyContext::for_field(&mut parent, &field, String::from("Ada"));

        assert_eq!(pc.full_path(), "People[1].first_name");
        assert_eq!(pc.wire_full_path(), "people[1].firstName");
        assert_eq!(pc.path(), "people[1].firstName");
        assert_eq!(pc.text(), "First name");
        assert!(!pc.is_text_overridden());
    }

    #[test]
    fn test_message_arguments() {
        let mut parent = context(ValidationArgs::new().use_wire_names(false));
        let field = first_name();
        let mut pc = PropertyContext::for_field(&mut parent, &field, String::from("Ada"));
        pc.add_error("{0} '{1}' exceeds {2}.", &[String::from("2")]);
        assert!(pc.has_error());

        let message = &parent.messages().as_slice()[0];
        assert_eq!(message.text, "First name 'Ada' exceeds 2.");
        assert_eq!(message.property.as_deref(), Some("first_name"));
    }

    #[test]
    fn test_error_text_replaces_errors_only() {
        let mut parent = context(ValidationArgs::new().use_wire_names(false));
        let field = first_name();
        let mut pc = PropertyContext::for_field(&mut parent, &field, String::from("Ada"));
        pc.set_error_text(Some(LText::from("{0} is wrong.")));
        pc.add_warning("{0} looks odd.", &[]);
        pc.add_error("ignored", &[]);

        let texts: Vec<_> = parent.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["First name looks odd.", "First name is wrong."]);
    }

    #[test]
    fn test_value_mode_naming() {
        let mut root = ValidationContext::for_value(String::from("x"));
        let pc = PropertyContext::for_value(&mut root, String::from("x"), None);
        assert_eq!(pc.path(), "value");
        assert_eq!(pc.text(), "Value");

        let mut nested = ValidationContext::new(
            Some(String::from("x")),
            ValidationArgs::new()
                .with_path("Order.PostCode", "order.postCode")
                .with_text("Post code"),
            Arc::new(ValidationDefaults::default()),
        );
        let pc = PropertyContext::for_value(&mut nested, String::from("x"), None);
        assert_eq!(pc.name(), "PostCode");
        assert_eq!(pc.wire_name(), "postCode");
        assert_eq!(pc.text(), "Post code");
        assert_eq!(pc.path(), "order.postCode");

        let pc = PropertyContext::for_value(&mut nested, String::from("x"), Some("Postal code"));
        assert_eq!(pc.text(), "Postal code");
        assert!(pc.is_text_overridden());
    }

    #[test]
    fn test_override_is_returned() {
        let mut parent = context(ValidationArgs::new());
        let field = first_name();
        let mut pc = PropertyContext::for_field(&mut parent, &field, String::from("Ada"));
        pc.set_value(String::from("Grace"));
        assert_eq!(pc.into_override().as_deref(), Some("Grace"));
    }
}
