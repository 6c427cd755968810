//! Text rules: length bounds, pattern and e-mail.
//!
//! All of them skip values that have no text or empty text; presence is the
//! job of `mandatory`.

use crate::context::PropertyContext;
use crate::error::{ConfigError, ValidationFailure};
use crate::rule::{PropertyRuleBuilder, Rule};
use crate::text::TextKey;
use crate::value::FieldValue;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;

/// Longest address accepted by [`Email`].
pub const EMAIL_MAX_LENGTH: usize = 254;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("e-mail pattern is valid")
});

fn text_of<T: FieldValue, P: FieldValue>(context: &PropertyContext<'_, T, P>) -> Option<String> {
    context
        .value()
        .as_text()
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

// ============================================================================
// LENGTH
// ============================================================================

/// Character-count bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Length {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

#[async_trait]
impl<T: FieldValue, P: FieldValue> Rule<T, P> for Length {
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        let Some(text) = text_of(context) else {
            return Ok(());
        };
        let count = text.chars().count();

        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max && count != min => {
                context.add_error(TextKey::ExactLength, &[min.to_string()]);
            }
            (Some(min), _) if count < min => {
                context.add_error(TextKey::MinLength, &[min.to_string()]);
            }
            (_, Some(max)) if count > max => {
                context.add_error(TextKey::MaxLength, &[max.to_string()]);
            }
            _ => {}
        }
        Ok(())
    }
}

// ============================================================================
// PATTERN
// ============================================================================

/// Text must match a regular expression.
#[derive(Debug, Clone)]
pub struct Matches {
    regex: Regex,
}

impl Matches {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|error| ConfigError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: error.to_string(),
            })
    }
}

impl From<Regex> for Matches {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

#[async_trait]
impl<T: FieldValue, P: FieldValue> Rule<T, P> for Matches {
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if let Some(text) = text_of(context)
            && !self.regex.is_match(&text)
        {
            context.add_error(TextKey::Regex, &[self.regex.as_str().to_owned()]);
        }
        Ok(())
    }
}

// ============================================================================
// E-MAIL
// ============================================================================

/// Text must be a syntactically valid e-mail address.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

#[async_trait]
impl<T: FieldValue, P: FieldValue> Rule<T, P> for Email {
    async fn validate(
        &self,
        context: &mut PropertyContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        let Some(text) = text_of(context) else {
            return Ok(());
        };
        if text.chars().count() > EMAIL_MAX_LENGTH {
            context.add_error(TextKey::MaxLength, &[EMAIL_MAX_LENGTH.to_string()]);
        } else if !EMAIL_REGEX.is_match(&text) {
            context.add_error(TextKey::Email, &[]);
        }
        Ok(())
    }
}

impl<T: FieldValue, P: FieldValue> PropertyRuleBuilder<T, P> {
    pub fn min_length(self, min: usize) -> Self {
        self.rule(Length {
            min: Some(min),
            max: None,
        })
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(Length {
            min: None,
            max: Some(max),
        })
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.rule(Length {
            min: Some(min),
            max: Some(max),
        })
    }

    /// Text must match `regex`.
    pub fn matches(self, regex: Regex) -> Self {
        self.rule(Matches::from(regex))
    }

    pub fn email(self) -> Self {
        self.rule(Email)
    }
}
