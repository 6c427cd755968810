use super::{
    add_aggregate_error, aggregate_text, element_args, execute, short_type_name, NestedAdapter, NestedValidate, Run,
    Validator,
};
use crate::args::ValidationArgs;
use crate::context::ValidationContext;
use crate::error::ConfigError;
use crate::settings::ValidationDefaults;
use crate::text::TextKey;
use crate::value::{Entries, FieldValue, Nested};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Validator for a key/value dictionary.
///
/// Same shape as [`CollectionValidator`](super::CollectionValidator), with
/// entries addressed as `path[key]`. Null keys and null values are tracked
/// separately and each reported once. For every entry the key validator runs
/// first, then the value validator; a fatal failure in either stops the walk.
/// There is no duplicate check since keys are unique.
pub struct DictionaryValidator<D: Entries> {
    name: &'static str,
    min_count: Option<usize>,
    max_count: Option<usize>,
    allow_null_keys: bool,
    allow_null_values: bool,
    text: Option<String>,
    key: Option<Box<dyn NestedValidate<D::Key>>>,
    value: Option<Box<dyn NestedValidate<D::Value>>>,
    defaults: Arc<ValidationDefaults>,
}

impl<D: Entries> DictionaryValidator<D> {
    pub fn builder() -> DictionaryValidatorBuilder<D> {
        DictionaryValidatorBuilder::new()
    }
}

impl<D: Entries> DictionaryValidator<D> {
    /// Runs `validator` on one key or value and merges the outcome.
    ///
    /// Returns false once the run is fatally failed.
    async fn validate_element<I: FieldValue>(
        validator: &dyn NestedValidate<I>,
        element: &I,
        segment: &str,
        text: &str,
        context: &mut ValidationContext<D>,
        cancel: &CancellationToken,
    ) -> bool {
        if cancel.is_cancelled() {
            tracing::debug!(segment, "validation cancelled within dictionary");
            context.cancel();
            return false;
        }
        let args = element_args(context, segment, text);
        if let Some(outcome) = validator.validate_nested(element, args, cancel).await {
            context.merge(outcome);
        }
        !context.has_failed()
    }
}

#[async_trait]
impl<D: Entries> Run<D> for DictionaryValidator<D> {
    async fn run(&self, context: &mut ValidationContext<D>, cancel: &CancellationToken) {
        let Some(dictionary) = context.value().cloned() else {
            return;
        };
        let text = aggregate_text(self.text.as_deref(), context);
        let entries: Vec<(&D::Key, &D::Value)> = dictionary.entries().collect();

        let mut has_null_key = false;
        let mut has_null_value = false;

        for (key, value) in entries.iter().copied() {
            has_null_key |= key.is_null() && !self.allow_null_keys;
            has_null_value |= value.is_null() && !self.allow_null_values;
            if context.is_shallow() {
                continue;
            }

            let segment = format!("[{}]", key.to_text());
            if let Some(validator) = &self.key
                && !key.is_null()
                && !Self::validate_element(validator.as_ref(), key, &segment, &text, context, cancel).await
            {
                return;
            }
            if let Some(validator) = &self.value
                && !value.is_null()
                && !Self::validate_element(validator.as_ref(), value, &segment, &text, context, cancel).await
            {
                return;
            }
        }

        if has_null_key {
            add_aggregate_error(context, TextKey::DictionaryNullKey, &text, &[]);
        }
        if has_null_value {
            add_aggregate_error(context, TextKey::DictionaryNullValue, &text, &[]);
        }

        let count = entries.len();
        if let Some(min) = self.min_count
            && count < min
        {
            add_aggregate_error(context, TextKey::MinCount, &text, &[min.to_string()]);
        } else if let Some(max) = self.max_count
            && count > max
        {
            add_aggregate_error(context, TextKey::MaxCount, &text, &[max.to_string()]);
        }
    }
}

#[async_trait]
impl<D: Entries> Validator for DictionaryValidator<D> {
    type Value = D;

    async fn validate_with(
        &self,
        value: Option<D>,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> ValidationContext<D> {
        execute(self.name, self, &self.defaults, value, args, cancel).await
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Fluent assembly of a [`DictionaryValidator`].
///
/// ```rust,ignore
/// let attributes = DictionaryValidator::<HashMap<String, Option<String>>>::builder()
///     .max_count(20)
///     .key(Arc::new(attribute_name))
///     .value(Arc::new(attribute_value))
///     .build()?;
/// ```
#[must_use = "builder methods must be chained or built"]
pub struct DictionaryValidatorBuilder<D: Entries> {
    min_count: Option<usize>,
    max_count: Option<usize>,
    allow_null_keys: bool,
    allow_null_values: bool,
    text: Option<String>,
    key: Option<Box<dyn NestedValidate<D::Key>>>,
    value: Option<Box<dyn NestedValidate<D::Value>>>,
    defaults: Option<Arc<ValidationDefaults>>,
}

impl<D: Entries> DictionaryValidatorBuilder<D> {
    pub fn new() -> Self {
        Self {
            min_count: None,
            max_count: None,
            allow_null_keys: false,
            allow_null_values: false,
            text: None,
            key: None,
            value: None,
            defaults: None,
        }
    }

    pub fn min_count(mut self, min: usize) -> Self {
        self.min_count = Some(min);
        self
    }

    pub fn max_count(mut self, max: usize) -> Self {
        self.max_count = Some(max);
        self
    }

    pub fn allow_null_keys(mut self, allow: bool) -> Self {
        self.allow_null_keys = allow;
        self
    }

    pub fn allow_null_values(mut self, allow: bool) -> Self {
        self.allow_null_values = allow;
        self
    }

    /// Friendly text for dictionary-level messages.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Validates each non-null key with `validator`.
    pub fn key<V>(mut self, validator: Arc<V>) -> Self
    where
        V: Validator + 'static,
        D::Key: Nested<V::Value>,
    {
        let validator: Arc<dyn Validator<Value = V::Value>> = validator;
        self.key = Some(Box::new(NestedAdapter::new(validator)));
        self
    }

    /// Validates each non-null value with `validator`.
    pub fn value<V>(mut self, validator: Arc<V>) -> Self
    where
        V: Validator + 'static,
        D::Value: Nested<V::Value>,
    {
        let validator: Arc<dyn Validator<Value = V::Value>> = validator;
        self.value = Some(Box::new(NestedAdapter::new(validator)));
        self
    }

    pub fn with_defaults(mut self, defaults: Arc<ValidationDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Finishes the validator.
    ///
    /// Fails when the minimum count exceeds the maximum.
    pub fn build(self) -> Result<DictionaryValidator<D>, ConfigError> {
        if let (Some(min), Some(max)) = (self.min_count, self.max_count)
            && min > max
        {
            return Err(ConfigError::InvalidCountRange { min, max });
        }

        Ok(DictionaryValidator {
            name: short_type_name::<D>(),
            min_count: self.min_count,
            max_count: self.max_count,
            allow_null_keys: self.allow_null_keys,
            allow_null_values: self.allow_null_values,
            text: self.text,
            key: self.key,
            value: self.value,
            defaults: self.defaults.unwrap_or_default(),
        })
    }
}

impl<D: Entries> Default for DictionaryValidatorBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}
