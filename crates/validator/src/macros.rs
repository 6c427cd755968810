//! Macros for binding rule chains to struct fields with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`field!`] — a read/write [`Field`](crate::rule::Field) for a struct field
//! - [`field_ref!`] — a read-only [`Field`](crate::rule::Field)
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_validation::{field, field_ref};
//!
//! let validator = EntityValidator::<Person>::builder()
//!     .property(field!(Person, first_name), |r| r.mandatory())
//!     .property(field!(Person, id, "Identifier"), |r| r.mandatory())
//!     .property(field_ref!(Person, created_at), |r| r.none())
//!     .build();
//! ```

// ============================================================================
// FIELD MACRO
// ============================================================================

/// Creates a [`Field`](crate::rule::Field) with getter and setter for
/// `$entity.$name`.
///
/// The native name is the field identifier, the wire name its camelCase form.
/// An optional third argument sets the display text.
///
/// ```rust,ignore
/// field!(Order, customer_id)            // "customer_id" / "customerId" / "Customer id"
/// field!(Order, customer_id, "Customer") // text overridden
/// ```
#[macro_export]
macro_rules! field {
    ($entity:ty, $name:ident) => {
        $crate::rule::Field::new(stringify!($name), |entity: &$entity| &entity.$name)
            .with_setter(|entity: &mut $entity, value| entity.$name = value)
    };
    ($entity:ty, $name:ident, $text:expr) => {
        $crate::field!($entity, $name).with_text($text)
    };
}

// ============================================================================
// FIELD_REF MACRO
// ============================================================================

/// Creates a getter-only [`Field`](crate::rule::Field) for `$entity.$name`.
///
/// Value overrides requested by rules stay local to the chain.
#[macro_export]
macro_rules! field_ref {
    ($entity:ty, $name:ident) => {
        $crate::rule::Field::new(stringify!($name), |entity: &$entity| &entity.$name)
    };
    ($entity:ty, $name:ident, $text:expr) => {
        $crate::field_ref!($entity, $name).with_text($text)
    };
}

// ============================================================================
// TESTS
// ============================================================================
