//! Message model
//!
//! An ordered, append-only list of typed messages produced by a validation
//! run. Each message carries the (native or wire) path of the field it
//! relates to and the rendered text.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// MESSAGE TYPE
// ============================================================================

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageType {
    /// Violation that makes the value invalid (default).
    #[default]
    Error,
    /// Should be addressed but does not invalidate the value.
    Warning,
    /// Informational only.
    Info,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Warning => f.write_str("Warning"),
            Self::Info => f.write_str("Info"),
        }
    }
}

// ============================================================================
// MESSAGE
// ============================================================================

/// A single validation message.
///
/// Serializes as `{ "property": .., "type": .., "text": .. }`, the shape
/// consumed by transport layers when rendering an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Dotted/bracketed path of the field, e.g. `addresses[1].street`.
    pub property: Option<String>,

    /// Severity.
    #[serde(rename = "type")]
    pub kind: MessageType,

    /// Rendered, human-readable text.
    pub text: String,
}

impl Message {
    /// Creates a message of the given kind without a property.
    pub fn new(kind: MessageType, text: impl Into<String>) -> Self {
        Self {
            property: None,
            kind,
            text: text.into(),
        }
    }

    /// Creates an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageType::Error, text)
    }

    /// Creates a warning message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageType::Warning, text)
    }

    /// Creates an informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageType::Info, text)
    }

    /// Sets the property path.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Returns true for [`MessageType::Error`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == MessageType::Error
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{} [{}]: {}", self.kind, property, self.text),
            None => write!(f, "{}: {}", self.kind, self.text),
        }
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

/// Ordered collection of [`Message`]s with a monotonic error flag.
///
/// Once an error has been appended `has_errors` stays true for the lifetime
/// of the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    items: Vec<Message>,
    has_errors: bool,
}

impl Messages {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        if message.is_error() {
            self.has_errors = true;
        }
        self.items.push(message);
    }

    /// Appends every message of `other`, preserving order.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Message>) {
        for message in other {
            self.push(message);
        }
    }

    /// Returns true once any error has been appended.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when no messages have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the messages in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.items.iter()
    }

    /// Returns the messages as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.items
    }

    /// Iterates messages of the given kind.
    pub fn of_kind(&self, kind: MessageType) -> impl Iterator<Item = &Message> {
        self.items.iter().filter(move |m| m.kind == kind)
    }

    /// Iterates messages recorded against `property`.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Message> {
        self.items
            .iter()
            .filter(move |m| m.property.as_deref() == Some(property))
    }

    /// Returns true if any message of the given kind exists.
    #[must_use]
    pub fn contains_kind(&self, kind: MessageType) -> bool {
        self.items.iter().any(|m| m.kind == kind)
    }
}

impl Serialize for Messages {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl IntoIterator for Messages {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Messages {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Message> for Messages {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        let mut messages = Self::new();
        messages.extend(iter);
        messages
    }
}

// ============================================================================
// TESTS
// ============================================================================
