//! Message text: well-known format identifiers, lookup and formatting
//!
//! Every built-in rule renders its message from a format string identified by
//! a [`TextKey`]. Format strings use positional placeholders; `{0}` is always
//! the field text and `{1}` the field value, rule arguments start at `{2}`.
//!
//! The lookup is pluggable through [`TextProvider`] so hosts can localise or
//! reword messages without touching rule code.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// TEXT KEYS
// ============================================================================

/// Well-known format-string identifiers, one per built-in rule kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TextKey {
    Mandatory,
    None,
    Must,
    Invalid,
    MinLength,
    MaxLength,
    ExactLength,
    Regex,
    Email,
    CompareEqual,
    CompareNotEqual,
    CompareLessThan,
    CompareLessThanEqual,
    CompareGreaterThan,
    CompareGreaterThanEqual,
    BetweenInclusive,
    BetweenExclusive,
    MinCount,
    MaxCount,
    Duplicate,
    DuplicateValue,
    DuplicateExists,
    CollectionNullItem,
    DictionaryNullKey,
    DictionaryNullValue,
    Exists,
    Immutable,
}

impl TextKey {
    /// All keys, in declaration order.
    pub const ALL: [Self; 27] = [
        Self::Mandatory,
        Self::None,
        Self::Must,
        Self::Invalid,
        Self::MinLength,
        Self::MaxLength,
        Self::ExactLength,
        Self::Regex,
        Self::Email,
        Self::CompareEqual,
        Self::CompareNotEqual,
        Self::CompareLessThan,
        Self::CompareLessThanEqual,
        Self::CompareGreaterThan,
        Self::CompareGreaterThanEqual,
        Self::BetweenInclusive,
        Self::BetweenExclusive,
        Self::MinCount,
        Self::MaxCount,
        Self::Duplicate,
        Self::DuplicateValue,
        Self::DuplicateExists,
        Self::CollectionNullItem,
        Self::DictionaryNullKey,
        Self::DictionaryNullValue,
        Self::Exists,
        Self::Immutable,
    ];

    /// Stable identifier used to override the text through settings.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Mandatory => "validation.mandatory",
            Self::None => "validation.none",
            Self::Must => "validation.must",
            Self::Invalid => "validation.invalid",
            Self::MinLength => "validation.min_length",
            Self::MaxLength => "validation.max_length",
            Self::ExactLength => "validation.exact_length",
            Self::Regex => "validation.regex",
            Self::Email => "validation.email",
            Self::CompareEqual => "validation.compare_equal",
            Self::CompareNotEqual => "validation.compare_not_equal",
            Self::CompareLessThan => "validation.compare_less_than",
            Self::CompareLessThanEqual => "validation.compare_less_than_equal",
            Self::CompareGreaterThan => "validation.compare_greater_than",
            Self::CompareGreaterThanEqual => "validation.compare_greater_than_equal",
            Self::BetweenInclusive => "validation.between_inclusive",
            Self::BetweenExclusive => "validation.between_exclusive",
            Self::MinCount => "validation.min_count",
            Self::MaxCount => "validation.max_count",
            Self::Duplicate => "validation.duplicate",
            Self::DuplicateValue => "validation.duplicate_value",
            Self::DuplicateExists => "validation.duplicate_exists",
            Self::CollectionNullItem => "validation.collection_null_item",
            Self::DictionaryNullKey => "validation.dictionary_null_key",
            Self::DictionaryNullValue => "validation.dictionary_null_value",
            Self::Exists => "validation.exists",
            Self::Immutable => "validation.immutable",
        }
    }

    /// Built-in English format string.
    #[must_use]
    pub fn default_format(self) -> &'static str {
        match self {
            Self::Mandatory => "{0} is required.",
            Self::None => "{0} must not be specified.",
            Self::Must | Self::Invalid | Self::Regex => "{0} is invalid.",
            Self::MinLength => "{0} must be at least {2} characters in length.",
            Self::MaxLength => "{0} must not exceed {2} characters in length.",
            Self::ExactLength => "{0} must be exactly {2} characters in length.",
            Self::Email => "{0} is an invalid e-mail address.",
            Self::CompareEqual => "{0} must be equal to {2}.",
            Self::CompareNotEqual => "{0} must not be equal to {2}.",
            Self::CompareLessThan => "{0} must be less than {2}.",
            Self::CompareLessThanEqual => "{0} must be less than or equal to {2}.",
            Self::CompareGreaterThan => "{0} must be greater than {2}.",
            Self::CompareGreaterThanEqual => "{0} must be greater than or equal to {2}.",
            Self::BetweenInclusive => "{0} must be between {2} and {3}.",
            Self::BetweenExclusive => "{0} must be between {2} and {3} (exclusive).",
            Self::MinCount => "{0} must have at least {2} item(s).",
            Self::MaxCount => "{0} must not exceed {2} item(s).",
            Self::Duplicate => "{0} contains duplicates; {2} value '{3}' specified more than once.",
            Self::DuplicateValue => "{0} contains duplicates; value '{2}' specified more than once.",
            Self::DuplicateExists => "{0} already exists and would result in a duplicate.",
            Self::CollectionNullItem => "{0} contains one or more items that are not specified.",
            Self::DictionaryNullKey => "{0} contains one or more keys that are not specified.",
            Self::DictionaryNullValue => "{0} contains one or more values that are not specified.",
            Self::Exists => "{0} is not found; a valid value is required.",
            Self::Immutable => "{0} is not allowed to change; please reset value.",
        }
    }

    /// Looks a key up by its [`id`](Self::id).
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.id() == id)
    }
}

impl fmt::Display for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// LOCALISABLE TEXT
// ============================================================================

/// Either a well-known key resolved through a [`TextProvider`], or literal
/// text supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LText {
    Key(TextKey),
    Literal(Cow<'static, str>),
}

impl LText {
    /// Resolves to a format string.
    pub fn resolve<'a>(&'a self, provider: &'a dyn TextProvider) -> Cow<'a, str> {
        match self {
            Self::Key(key) => provider.text(*key),
            Self::Literal(text) => Cow::Borrowed(text.as_ref()),
        }
    }
}

impl From<TextKey> for LText {
    fn from(key: TextKey) -> Self {
        Self::Key(key)
    }
}

impl From<&'static str> for LText {
    fn from(text: &'static str) -> Self {
        Self::Literal(Cow::Borrowed(text))
    }
}

impl From<String> for LText {
    fn from(text: String) -> Self {
        Self::Literal(Cow::Owned(text))
    }
}

// ============================================================================
// TEXT PROVIDER
// ============================================================================

/// Pluggable lookup of the format string for a [`TextKey`].
pub trait TextProvider: Send + Sync + fmt::Debug {
    /// Returns the format string for `key`.
    fn text(&self, key: TextKey) -> Cow<'_, str>;
}

/// Built-in English texts with optional per-key overrides.
///
/// # Examples
///
/// ```rust,ignore
/// let provider = DefaultTextProvider::new()
///     .with_override(TextKey::Mandatory, "{0} must be provided.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultTextProvider {
    overrides: HashMap<TextKey, String>,
}

impl DefaultTextProvider {
    /// Creates a provider with the built-in texts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the text for one key.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_override(mut self, key: TextKey, text: impl Into<String>) -> Self {
        self.overrides.insert(key, text.into());
        self
    }

    /// Number of overridden keys.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl TextProvider for DefaultTextProvider {
    fn text(&self, key: TextKey) -> Cow<'_, str> {
        match self.overrides.get(&key) {
            Some(text) => Cow::Borrowed(text.as_str()),
            None => Cow::Borrowed(key.default_format()),
        }
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Replaces positional `{n}` placeholders in `template` with `args[n]`.
///
/// `{{` and `}}` render literal braces. Placeholders without a matching
/// argument are left untouched.
#[must_use]
pub fn format_text(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let rest = &template[start + 1..];
                let replaced = rest.find('}').and_then(|end| {
                    let index: usize = rest[..end].parse().ok()?;
                    args.get(index).map(|arg| (arg, end))
                });
                match replaced {
                    Some((arg, end)) => {
                        out.push_str(arg);
                        // skip the digits and the closing brace
                        for _ in 0..=rest[..end].chars().count() {
                            chars.next();
                        }
                    }
                    None => out.push('{'),
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }

        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            words.push(std::mem::take(&mut current));
        }

        current.push(c);
        prev = Some(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders an identifier as sentence-case display text.
///
/// Any trailing indexer (`[..]`) is dropped.
///
/// ```rust,ignore
/// assert_eq!(to_sentence_case("first_name"), "First name");
/// assert_eq!(to_sentence_case("firstName"), "First Name");
/// assert_eq!(to_sentence_case("addresses[2]"), "Addresses");
/// ```
#[must_use]
pub fn to_sentence_case(name: &str) -> String {
    let name = name.split('[').next().unwrap_or(name);
    let words = split_words(name);

    let mut out = String::with_capacity(name.len() + words.len());
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&capitalize(word));
        } else {
            out.push(' ');
            out.push_str(word);
        }
    }
    out
}

/// Renders an identifier as lower camel case, the default wire name.
///
/// ```rust,ignore
/// assert_eq!(to_camel_case("first_name"), "firstName");
/// assert_eq!(to_camel_case("Id"), "id");
/// ```
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let words = split_words(name);

    let mut out = String::with_capacity(name.len());
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
