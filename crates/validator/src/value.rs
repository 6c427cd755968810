//! Value capabilities
//!
//! Rules never inspect values reflectively. Instead every validated type
//! declares what the engine needs to know through [`FieldValue`]: whether it
//! is null, whether it carries a meaningful value, and how it renders as text
//! inside a message.
//!
//! Entity types opt in with an empty impl:
//!
//! ```rust,ignore
//! #[derive(Clone)]
//! struct Address { street: String, city: String }
//!
//! impl FieldValue for Address {}
//! ```
//!
//! The remaining traits are the shapes the nested validators work over:
//! [`Nested`] (an entity or an optional entity), [`Items`] (homogeneous
//! collections), [`Entries`] (dictionaries) and [`Inherits`] (base inclusion).

use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

// ============================================================================
// FIELD VALUE
// ============================================================================

/// Capability trait for any value a rule can be bound to.
///
/// All methods have defaults that suit entity types: never null, always has a
/// value, renders as empty text.
pub trait FieldValue: Clone + Send + Sync + 'static {
    /// Returns true for the null / absent state (`None`).
    fn is_null(&self) -> bool {
        false
    }

    /// Returns true when the value is meaningfully present.
    ///
    /// Numbers are missing when zero, strings when blank, collections when
    /// empty, options when `None`.
    fn has_value(&self) -> bool {
        !self.is_null()
    }

    /// Returns true for empty or whitespace-only text.
    fn is_blank(&self) -> bool {
        false
    }

    /// Borrowed text view, for values that are text.
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Text rendering used as the `{1}` message argument.
    fn to_text(&self) -> String {
        String::new()
    }
}

macro_rules! numeric_field_value {
    ($zero:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn has_value(&self) -> bool {
                    *self != $zero
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

numeric_field_value!(0 => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
numeric_field_value!(0.0 => f32, f64);

impl FieldValue for bool {
    fn has_value(&self) -> bool {
        *self
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for char {
    fn has_value(&self) -> bool {
        *self != '\0'
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

macro_rules! text_field_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn has_value(&self) -> bool {
                    !self.is_blank()
                }

                fn is_blank(&self) -> bool {
                    self.trim().is_empty()
                }

                fn as_text(&self) -> Option<&str> {
                    Some(self)
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

text_field_value!(String, &'static str, Cow<'static, str>);

impl FieldValue for () {
    fn is_null(&self) -> bool {
        true
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn has_value(&self) -> bool {
        self.as_ref().is_some_and(|v| !v.is_null() && !v.is_blank())
    }

    fn is_blank(&self) -> bool {
        self.as_ref().is_none_or(FieldValue::is_blank)
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(FieldValue::as_text)
    }

    fn to_text(&self) -> String {
        self.as_ref().map(FieldValue::to_text).unwrap_or_default()
    }
}

/// JSON documents: `null` is null, empty strings, arrays and objects carry no
/// value.
impl FieldValue for serde_json::Value {
    fn is_null(&self) -> bool {
        self.is_null()
    }

    fn has_value(&self) -> bool {
        match self {
            Self::Null => false,
            Self::String(text) => !text.trim().is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Object(fields) => !fields.is_empty(),
            Self::Bool(_) | Self::Number(_) => true,
        }
    }

    fn is_blank(&self) -> bool {
        self.as_str().is_some_and(|text| text.trim().is_empty())
    }

    fn as_text(&self) -> Option<&str> {
        self.as_str()
    }

    fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

macro_rules! sequence_field_value {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: FieldValue> FieldValue for $ty<T> {
                fn has_value(&self) -> bool {
                    !self.is_empty()
                }

                fn to_text(&self) -> String {
                    self.iter().map(FieldValue::to_text).collect::<Vec<_>>().join(", ")
                }
            }
        )+
    };
}

sequence_field_value!(Vec, VecDeque);

impl<K, V> FieldValue for HashMap<K, V>
where
    K: FieldValue + Eq + Hash,
    V: FieldValue,
{
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> FieldValue for BTreeMap<K, V>
where
    K: FieldValue + Ord,
    V: FieldValue,
{
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> FieldValue for IndexMap<K, V>
where
    K: FieldValue + Eq + Hash,
    V: FieldValue,
{
    fn has_value(&self) -> bool {
        !self.is_empty()
    }
}

// ============================================================================
// NESTED
// ============================================================================

/// A property that holds an `E`, or possibly holds one.
///
/// Implemented for `E` itself and for `Option<E>`, so the same nested rule or
/// comparison works on required and optional fields alike.
pub trait Nested<E>: FieldValue {
    /// The nested value, or `None` when absent.
    fn nested(&self) -> Option<&E>;
}

impl<E: FieldValue> Nested<E> for E {
    fn nested(&self) -> Option<&E> {
        Some(self)
    }
}

impl<E: FieldValue> Nested<E> for Option<E> {
    fn nested(&self) -> Option<&E> {
        self.as_ref()
    }
}

// ============================================================================
// ITEMS / ENTRIES
// ============================================================================

/// A homogeneous, ordered collection.
pub trait Items: FieldValue {
    /// Item type; may itself be nullable (`Option<E>`).
    type Item: FieldValue;

    /// Iterates the items in order.
    fn items(&self) -> impl Iterator<Item = &Self::Item> + Send;
}

impl<T: FieldValue> Items for Vec<T> {
    type Item = T;

    fn items(&self) -> impl Iterator<Item = &T> + Send {
        self.iter()
    }
}

impl<T: FieldValue> Items for VecDeque<T> {
    type Item = T;

    fn items(&self) -> impl Iterator<Item = &T> + Send {
        self.iter()
    }
}

/// A key/value dictionary.
pub trait Entries: FieldValue {
    /// Key type.
    type Key: FieldValue;
    /// Value type; may itself be nullable.
    type Value: FieldValue;

    /// Iterates the entries in the dictionary's own order.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)> + Send;
}

impl<K, V> Entries for HashMap<K, V>
where
    K: FieldValue + Eq + Hash,
    V: FieldValue,
{
    type Key = K;
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> + Send {
        self.iter()
    }
}

impl<K, V> Entries for BTreeMap<K, V>
where
    K: FieldValue + Ord,
    V: FieldValue,
{
    type Key = K;
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> + Send {
        self.iter()
    }
}

impl<K, V> Entries for IndexMap<K, V>
where
    K: FieldValue + Eq + Hash,
    V: FieldValue,
{
    type Key = K;
    type Value = V;

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> + Send {
        self.iter()
    }
}

// ============================================================================
// INHERITS
// ============================================================================

/// Declares that a type can be viewed as its ancestor shape `B`.
///
/// Base inclusion validates the `B` view with `B`'s own validator. Returning
/// `None` is a fatal `IncompatibleBase` failure for that run.
///
/// ```rust,ignore
/// impl Inherits<Party> for Person {
///     fn base(&self) -> Option<&Party> { Some(&self.party) }
///     fn base_mut(&mut self) -> Option<&mut Party> { Some(&mut self.party) }
/// }
/// ```
pub trait Inherits<B>: FieldValue {
    /// Shared view of the ancestor shape.
    fn base(&self) -> Option<&B>;

    /// Mutable view of the ancestor shape, used to write back overrides.
    fn base_mut(&mut self) -> Option<&mut B>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0_i32, false)]
    #[case(7_i32, true)]
    #[case(-1_i32, true)]
    fn test_number_has_value(#[case] value: i32, #[case] expected: bool) {
        assert_eq!(value.has_value(), expected);
    }

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("x", true)]
    fn test_text_has_value(#[case] value: &'static str, #[case] expected: bool) {
        assert_eq!(value.has_value(), expected);
        assert_eq!(value.to_string().has_value(), expected);
    }

    #[test]
    fn test_option_semantics() {
        let none: Option<String> = None;
        assert!(none.is_null());
        assert!(!none.has_value());
        assert!(!Some(String::from(" ")).has_value());
        assert!(Some(String::from("a")).has_value());
        assert_eq!(Some(5_u8).to_text(), "5");
        assert_eq!(none.to_text(), "");
        assert_eq!(Some(String::from("abc")).as_text(), Some("abc"));
    }

    #[test]
    fn test_option_of_zero_has_value() {
        // presence of the option is what counts, not the number inside
        assert!(Some(0_i32).has_value());
    }

    #[test]
    fn test_collections_have_value_when_non_empty() {
        assert!(!Vec::<i32>::new().has_value());
        assert!(vec![1].has_value());
        assert_eq!(vec![1, 2].to_text(), "1, 2");

        let mut map = HashMap::new();
        assert!(!map.has_value());
        map.insert(String::from("a"), 1_i32);
        assert!(map.has_value());
    }

    #[test]
    fn test_json_values() {
        use serde_json::json;

        assert!(FieldValue::is_null(&json!(null)));
        assert!(!json!("  ").has_value());
        assert!(!json!([]).has_value());
        assert!(json!(0).has_value());
        assert_eq!(json!("abc").as_text(), Some("abc"));
        assert_eq!(json!("abc").to_text(), "abc");
        assert_eq!(json!([1, 2]).to_text(), "[1,2]");
    }

    #[test]
    fn test_nested_views() {
        let required = 5_i32;
        let optional: Option<i32> = None;
        assert_eq!(Nested::<i32>::nested(&required), Some(&5));
        assert_eq!(Nested::<i32>::nested(&optional), None);
    }

    #[test]
    fn test_items_and_entries_iterate_in_order() {
        let items = vec![Some(1_i32), None, Some(3)];
        assert_eq!(items.items().filter(|i| i.is_null()).count(), 1);

        let mut map = IndexMap::new();
        map.insert(String::from("b"), 2_i32);
        map.insert(String::from("a"), 1_i32);
        let keys: Vec<_> = map.entries().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
