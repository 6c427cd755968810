use super::{
    add_aggregate_error, aggregate_text, element_args, execute, short_type_name, NestedAdapter, NestedValidate, Run,
    Validator,
};
use crate::args::ValidationArgs;
use crate::context::ValidationContext;
use crate::error::ConfigError;
use crate::settings::ValidationDefaults;
use crate::text::TextKey;
use crate::value::{FieldValue, Items, Nested};
use async_trait::async_trait;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type DuplicateFinder<I> = Box<dyn Fn(&[&I]) -> Option<String> + Send + Sync>;

fn finder<I, F>(find: F) -> DuplicateFinder<I>
where
    F: Fn(&[&I]) -> Option<String> + Send + Sync + 'static,
{
    Box::new(find)
}

/// Whole-collection duplicate detection.
struct DuplicateCheck<I> {
    // Friendly name of the compared key, e.g. "Product".
    key_text: Option<String>,
    // Returns the display form of the first repeated key.
    find: DuplicateFinder<I>,
}

// ============================================================================
// COLLECTION VALIDATOR
// ============================================================================

/// Validator for an ordered collection.
///
/// A run:
///
/// 1. Walks the items in order. Null items are counted, not validated; other
///    items go to the item validator at `path[i]` (not when shallow). A fatal
///    item failure stops the walk.
/// 2. Records one aggregate message when null items were found and are not
///    allowed.
/// 3. Checks the minimum count, and the maximum only when the minimum holds.
/// 4. Runs the duplicate check, unless some item recorded its own error.
///
/// ```rust,ignore
/// let lines = CollectionValidator::<Vec<OrderLine>>::builder()
///     .min_count(1)
///     .max_count(50)
///     .item(Arc::clone(&line_validator))
///     .duplicate_check_by("Product", |line: &OrderLine| line.product.clone())
///     .build()?;
/// ```
pub struct CollectionValidator<C: Items> {
    name: &'static str,
    min_count: Option<usize>,
    max_count: Option<usize>,
    allow_null_items: bool,
    text: Option<String>,
    item: Option<Box<dyn NestedValidate<C::Item>>>,
    duplicate: Option<DuplicateCheck<C::Item>>,
    defaults: Arc<ValidationDefaults>,
}

impl<C: Items> CollectionValidator<C> {
    pub fn builder() -> CollectionValidatorBuilder<C> {
        CollectionValidatorBuilder::new()
    }

    pub fn min_count(&self) -> Option<usize> {
        self.min_count
    }

    pub fn max_count(&self) -> Option<usize> {
        self.max_count
    }
}

#[async_trait]
impl<C: Items> Run<C> for CollectionValidator<C> {
    async fn run(&self, context: &mut ValidationContext<C>, cancel: &CancellationToken) {
        let Some(collection) = context.value().cloned() else {
            return;
        };
        let text = aggregate_text(self.text.as_deref(), context);
        let items: Vec<&C::Item> = collection.items().collect();

        let mut has_null = false;
        let mut has_item_errors = false;

        for (index, item) in items.iter().copied().enumerate() {
            if item.is_null() {
                has_null |= !self.allow_null_items;
                continue;
            }
            let Some(validator) = &self.item else {
                continue;
            };
            if context.is_shallow() {
                continue;
            }
            if cancel.is_cancelled() {
                tracing::debug!(index, "validation cancelled within collection");
                context.cancel();
                return;
            }

            let args = element_args(context, &format!("[{index}]"), &text);
            if let Some(outcome) = validator.validate_nested(item, args, cancel).await {
                has_item_errors |= outcome.has_errors();
                context.merge(outcome);
                if context.has_failed() {
                    return;
                }
            }
        }

        if has_null {
            add_aggregate_error(context, TextKey::CollectionNullItem, &text, &[]);
        }

        let count = items.len();
        if let Some(min) = self.min_count
            && count < min
        {
            add_aggregate_error(context, TextKey::MinCount, &text, &[min.to_string()]);
        } else if let Some(max) = self.max_count
            && count > max
        {
            add_aggregate_error(context, TextKey::MaxCount, &text, &[max.to_string()]);
        }

        if !has_item_errors
            && let Some(check) = &self.duplicate
            && let Some(duplicate) = (check.find)(&items)
        {
            match &check.key_text {
                Some(key_text) => add_aggregate_error(
                    context,
                    TextKey::Duplicate,
                    &text,
                    &[key_text.clone(), duplicate],
                ),
                None => add_aggregate_error(context, TextKey::DuplicateValue, &text, &[duplicate]),
            }
        }
    }
}

#[async_trait]
impl<C: Items> Validator for CollectionValidator<C> {
    type Value = C;

    async fn validate_with(
        &self,
        value: Option<C>,
        args: ValidationArgs,
        cancel: &CancellationToken,
    ) -> ValidationContext<C> {
        execute(self.name, self, &self.defaults, value, args, cancel).await
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Fluent assembly of a [`CollectionValidator`].
#[must_use = "builder methods must be chained or built"]
pub struct CollectionValidatorBuilder<C: Items> {
    min_count: Option<usize>,
    max_count: Option<usize>,
    allow_null_items: bool,
    text: Option<String>,
    item: Option<Box<dyn NestedValidate<C::Item>>>,
    duplicate: Option<DuplicateCheck<C::Item>>,
    defaults: Option<Arc<ValidationDefaults>>,
}

impl<C: Items> CollectionValidatorBuilder<C> {
    pub fn new() -> Self {
        Self {
            min_count: None,
            max_count: None,
            allow_null_items: false,
            text: None,
            item: None,
            duplicate: None,
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

    /// Accepts null items instead of reporting them.
    pub fn allow_null_items(mut self, allow: bool) -> Self {
        self.allow_null_items = allow;
        self
    }

    /// Friendly text for collection-level messages.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Validates each non-null item with `validator`.
    pub fn item<V>(mut self, validator: Arc<V>) -> Self
    where
        V: Validator + 'static,
        C::Item: Nested<V::Value>,
    {
        let validator: Arc<dyn Validator<Value = V::Value>> = validator;
        self.item = Some(Box::new(NestedAdapter::new(validator)));
        self
    }

    /// Reports the first item whose `key` repeats an earlier one.
    ///
    /// `key_text` names the key in the message, e.g. "Product".
    pub fn duplicate_check_by<K, F>(mut self, key_text: impl Into<String>, key: F) -> Self
    where
        K: Eq + Hash + ToString,
        F: Fn(&C::Item) -> K + Send + Sync + 'static,
    {
        let find = finder(move |items: &[&C::Item]| {
            let mut seen = HashSet::new();
            for item in items.iter().copied().filter(|item| !item.is_null()) {
                let k = key(item);
                if seen.contains(&k) {
                    return Some(k.to_string());
                }
                seen.insert(k);
            }
            None
        });
        self.duplicate = Some(DuplicateCheck {
            key_text: Some(key_text.into()),
            find,
        });
        self
    }

    /// Reports the first item equal to an earlier one.
    pub fn duplicate_check(mut self) -> Self
    where
        C::Item: Eq + Hash,
    {
        let find = finder(|items: &[&C::Item]| {
            let mut seen = HashSet::new();
            items
                .iter()
                .copied()
                .filter(|item| !item.is_null())
                .find(|item| !seen.insert(*item))
                .map(FieldValue::to_text)
        });
        self.duplicate = Some(DuplicateCheck {
            key_text: None,
            find,
        });
        self
    }

    pub fn with_defaults(mut self, defaults: Arc<ValidationDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Finishes the validator.
    ///
    /// Fails when the minimum count exceeds the maximum.
    pub fn build(self) -> Result<CollectionValidator<C>, ConfigError> {
        if let (Some(min), Some(max)) = (self.min_count, self.max_count)
            && min > max
        {
            return Err(ConfigError::InvalidCountRange { min, max });
        }

        Ok(CollectionValidator {
            name: short_type_name::<C>(),
            min_count: self.min_count,
            max_count: self.max_count,
            allow_null_items: self.allow_null_items,
            text: self.text,
            item: self.item,
            duplicate: self.duplicate,
            defaults: self.defaults.unwrap_or_default(),
        })
    }
}

impl<C: Items> Default for CollectionValidatorBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
