//! # nebula-validation
//!
//! Declarative, composable validation pipelines for entities, values,
//! collections and dictionaries.
//!
//! A validator is assembled per type from ordered rule chains bound to
//! individual fields. Chains can be gated with clauses, recurse into nested
//! entities and collections, and every violation ends up in a single
//! aggregated [`ValidationContext`] tagged with a stable, hierarchical path.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebula_validation::prelude::*;
//!
//! #[derive(Clone)]
//! struct Person { name: String, age: u32 }
//! impl FieldValue for Person {}
//!
//! let validator = EntityValidator::<Person>::builder()
//!     .property(field!(Person, name), |r| r.mandatory().max_length(50))
//!     .property(field!(Person, age), |r| r.between(18, 120))
//!     .build();
//!
//! let context = validator.validate(person).await;
//! if context.has_errors() {
//!     for message in context.messages() {
//!         println!("{message}");
//!     }
//! }
//! ```
//!
//! ## Two failure channels
//!
//! - **Messages** — ordinary, accumulated violations ([`Messages`]). A field
//!   stops at its first error; sibling fields keep running.
//! - **Failures** — fatal states ([`ValidationFailure`]) such as cancellation
//!   or a base-inclusion mismatch. Nothing else runs once one is recorded.

// Deep generic nesting (PropertyRule<T, P> behind Box<dyn ValidatorRule<T>>)
// is inherent to binding rules to typed fields.
#![allow(clippy::type_complexity)]

mod macros;

pub mod args;
pub mod clause;
pub mod config;
pub mod context;
pub mod error;
pub mod invoker;
pub mod message;
pub mod prelude;
pub mod rule;
pub mod rules;
pub mod settings;
pub mod text;
pub mod validator;
pub mod value;

pub use args::{OperationType, ValidationArgs};
pub use config::ValidationConfig;
pub use context::{PropertyContext, ValidationContext, ValidationOutcome};
pub use error::{ConfigError, Error, Result, ValidationError, ValidationFailure};
pub use message::{Message, MessageType, Messages};
pub use settings::{ValidationDefaults, ValidationSettings};
pub use rule::{Field, PropertyRule, PropertyRuleBuilder};
pub use validator::{
    CollectionValidator, CommonValidator, DictionaryValidator, EntityValidator, MultiValidator, Validator,
};
pub use value::FieldValue;
