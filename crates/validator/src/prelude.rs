//! Prelude module for convenient imports.
//!
//! Provides a single `use nebula_validation::prelude::*;` import that brings
//! in the validators, builders, contexts and capability traits needed to
//! define and run validations.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_validation::prelude::*;
//!
//! let validator = EntityValidator::<Person>::builder()
//!     .property(field!(Person, name), |r| r.mandatory().max_length(50))
//!     .build();
//! let context = validator.validate(person).await;
//! ```

// ============================================================================
// RUN STATE AND RESULTS
// ============================================================================

pub use crate::args::{OperationType, ValidationArgs};
pub use crate::config::ValidationConfig;
pub use crate::context::{PropertyContext, ValidationContext, ValidationOutcome};
pub use crate::error::{ConfigError, Error, ValidationError, ValidationFailure};
pub use crate::message::{Message, MessageType, Messages};
pub use crate::settings::{ValidationDefaults, ValidationSettings};
pub use crate::text::{LText, TextKey};

// ============================================================================
// RULES AND VALIDATORS
// ============================================================================

pub use crate::clause::Clause;
pub use crate::rule::{Field, PropertyRule, PropertyRuleBuilder, Rule, ValidatorRule};
pub use crate::rules::CompareOperator;
pub use crate::validator::{
    CollectionValidator, CommonValidator, DictionaryValidator, EntityHook, EntityValidator, MultiValidator,
    MultiValidatorResult, Validator,
};
pub use crate::value::{Entries, FieldValue, Inherits, Items, Nested};
pub use crate::{field, field_ref};

// ============================================================================
// RUNTIME
// ============================================================================

pub use tokio_util::sync::CancellationToken;
