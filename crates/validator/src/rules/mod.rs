//! Built-in atomic rules
//!
//! Every rule here is also reachable as a builder method on
//! [`PropertyRuleBuilder`](crate::rule::PropertyRuleBuilder):
//!
//! ```rust,ignore
//! PropertyRule::builder(field!(Person, email))
//!     .mandatory()
//!     .email()
//!     .exists(lookup)
//!     .build();
//! ```
//!
//! Messages are formatted with `{0}` = field text, `{1}` = field value and
//! rule arguments from `{2}`.

mod compare;
mod external;
mod modify;
mod nested;
mod presence;
mod string;

pub use compare::{Between, Compare, CompareOperator, CompareProperty, IsIn};
pub use external::{Duplicate, Exists, Immutable};
pub use modify::{Custom, DefaultValue, OverrideValue};
pub use nested::NestedRule;
pub use presence::{Mandatory, Must, MustEntity, NoneRule};
pub use string::{Email, Length, Matches, EMAIL_MAX_LENGTH};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ValidationArgs;
    use crate::context::ValidationContext;
    use crate::error::ValidationFailure;
    use crate::rule::{Field, PropertyRule, PropertyRuleBuilder, ValidatorRule};
    use crate::settings::ValidationDefaults;
    use crate::value::FieldValue;
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use rstest::rstest;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Clone, Default)]
    struct Account {
        name: String,
        email: String,
        age: u32,
        min_age: Option<u32>,
        max_age: Option<u32>,
        nickname: Option<String>,
    }

    impl FieldValue for Account {}

    fn name() -> Field<Account, String> {
        Field::new("name", |a: &Account| &a.name)
    }

    fn email() -> Field<Account, String> {
        Field::new("email", |a: &Account| &a.email)
    }

    fn age() -> Field<Account, u32> {
        Field::new("age", |a: &Account| &a.age)
    }

    fn min_age() -> Field<Account, Option<u32>> {
        Field::new("min_age", |a: &Account| &a.min_age)
    }

    fn max_age() -> Field<Account, Option<u32>> {
        Field::new("max_age", |a: &Account| &a.max_age)
    }

    fn nickname() -> Field<Account, Option<String>> {
        Field::new("nickname", |a: &Account| &a.nickname).with_setter(|a: &mut Account, v| a.nickname = v)
    }

    fn account() -> Account {
        Account {
            name: "bob".into(),
            email: "bob@example.com".into(),
            age: 30,
            ..Account::default()
        }
    }

    async fn run<P, F>(value: Account, field: Field<Account, P>, configure: F) -> ValidationContext<Account>
    where
        P: FieldValue,
        F: FnOnce(PropertyRuleBuilder<Account, P>) -> PropertyRuleBuilder<Account, P>,
    {
        let chain = configure(PropertyRule::builder(field)).build();
        let mut context = ValidationContext::new(
            Some(value),
            ValidationArgs::new().use_wire_names(false),
            Arc::new(ValidationDefaults::default()),
        );
        chain.run(&mut context, &CancellationToken::new()).await;
        context
    }

    fn only_error(context: &ValidationContext<Account>) -> (&str, &str) {
        assert_eq!(context.messages().len(), 1, "{:?}", context.messages());
        let message = &context.messages().as_slice()[0];
        (message.property.as_deref().unwrap_or(""), message.text.as_str())
    }

    #[tokio::test]
    async fn test_mandatory_on_blank_text() {
        let account = Account {
            name: "  ".into(),
            ..account()
        };
        let context = run(account, name(), PropertyRuleBuilder::mandatory).await;
        assert_eq!(only_error(&context), ("name", "Name is required."));
    }

    #[tokio::test]
    async fn test_none_rejects_value() {
        let context = run(account(), name(), PropertyRuleBuilder::none).await;
        assert_eq!(only_error(&context), ("name", "Name must not be specified."));
    }

    #[rstest]
    #[case("bobby", None)]
    #[case("ab", Some("Name must be at least 3 characters in length."))]
    #[case("abcdefghi", Some("Name must not exceed 8 characters in length."))]
    #[tokio::test]
    async fn test_length_bounds(#[case] value: &str, #[case] expected: Option<&str>) {
        let account = Account {
            name: value.into(),
            ..account()
        };
        let context = run(account, name(), |r| r.length(3, 8)).await;
        let actual = context.messages().iter().next().map(|m| m.text.as_str());
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_exact_length() {
        let context = run(account(), name(), |r| r.length(4, 4)).await;
        assert_eq!(
            only_error(&context),
            ("name", "Name must be exactly 4 characters in length.")
        );
    }

    #[tokio::test]
    async fn test_length_skips_empty_text() {
        let account = Account {
            name: String::new(),
            ..account()
        };
        let context = run(account, name(), |r| r.min_length(3)).await;
        assert!(context.messages().is_empty());
    }

    #[tokio::test]
    async fn test_matches() {
        let pattern = Regex::new("^[a-z]+$").unwrap();
        let account = Account {
            name: "Bob1".into(),
            ..account()
        };
        let context = run(account, name(), |r| r.matches(pattern)).await;
        assert_eq!(only_error(&context), ("name", "Name is invalid."));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        assert!(Matches::new("(unclosed").is_err());
    }

    #[rstest]
    #[case("bob@example.com", true)]
    #[case("first.last+tag@sub.example.org", true)]
    #[case("not-an-address", false)]
    #[case("two@@example.com", false)]
    #[tokio::test]
    async fn test_email(#[case] value: &str, #[case] valid: bool) {
        let account = Account {
            email: value.into(),
            ..account()
        };
        let context = run(account, email(), PropertyRuleBuilder::email).await;
        assert_eq!(!context.has_errors(), valid);
    }

    #[tokio::test]
    async fn test_email_too_long() {
        let account = Account {
            email: format!("{}@example.com", "a".repeat(250)),
            ..account()
        };
        let context = run(account, email(), PropertyRuleBuilder::email).await;
        assert_eq!(
            only_error(&context),
            ("email", "Email must not exceed 254 characters in length.")
        );
    }

    #[rstest]
    #[case(17, false)]
    #[case(18, true)]
    #[case(65, true)]
    #[case(66, false)]
    #[tokio::test]
    async fn test_between_inclusive(#[case] value: u32, #[case] valid: bool) {
        let account = Account { age: value, ..account() };
        let context = run(account, age(), |r| r.between(18, 65)).await;
        assert_eq!(!context.has_errors(), valid);
    }

    #[tokio::test]
    async fn test_between_exclusive_message() {
        let account = Account { age: 18, ..account() };
        let context = run(account, age(), |r| r.between_exclusive(18, 65)).await;
        assert_eq!(
            only_error(&context),
            ("age", "Age must be between 18 and 65 (exclusive).")
        );
    }

    #[tokio::test]
    async fn test_compare_constant() {
        let context = run(account(), age(), |r| r.greater_than(40)).await;
        assert_eq!(only_error(&context), ("age", "Age must be greater than 40."));
    }

    #[tokio::test]
    async fn test_compare_skips_absent_option() {
        let context = run(account(), min_age(), |r| r.greater_than(0u32)).await;
        assert!(context.messages().is_empty());
    }

    #[tokio::test]
    async fn test_compare_property() {
        let account = Account {
            min_age: Some(20),
            max_age: Some(10),
            ..account()
        };
        let context = run(account, max_age(), |r| {
            r.compare_property::<u32>(CompareOperator::GreaterThanEqual, &min_age())
        })
        .await;
        assert_eq!(
            only_error(&context),
            ("max_age", "Max age must be greater than or equal to Min age.")
        );
    }

    #[tokio::test]
    async fn test_is_in() {
        let context = run(account(), name(), |r| r.is_in(["alice".to_owned(), "carol".to_owned()])).await;
        assert_eq!(only_error(&context), ("name", "Name is invalid."));
    }

    #[tokio::test]
    async fn test_must_and_must_entity() {
        let context = run(account(), age(), |r| r.must(|age| *age % 2 == 1)).await;
        assert_eq!(only_error(&context), ("age", "Age is invalid."));

        let context = run(account(), age(), |r| r.must_entity(|a: &Account| a.name.len() > 3)).await;
        assert_eq!(only_error(&context), ("age", "Age is invalid."));
    }

    #[tokio::test]
    async fn test_error_text_replaces_message() {
        let account = Account {
            name: String::new(),
            ..account()
        };
        let context = run(account, name(), |r| r.mandatory().error_text("{0} cannot be left out.")).await;
        assert_eq!(only_error(&context), ("name", "Name cannot be left out."));
    }

    #[tokio::test]
    async fn test_default_value_written_back() {
        let context = run(account(), nickname(), |r| {
            r.default_value(|a: &Account| Some(a.name.clone())).mandatory()
        })
        .await;
        assert!(context.messages().is_empty());
        assert_eq!(context.value().and_then(|a| a.nickname.clone()), Some("bob".to_owned()));
    }

    #[tokio::test]
    async fn test_override_value_without_setter_stays_local() {
        let context = run(account(), name(), |r| {
            r.override_value(|_: &Account| String::new()).mandatory()
        })
        .await;
        assert_eq!(only_error(&context), ("name", "Name is required."));
        assert_eq!(context.value().map(|a| a.name.as_str()), Some("bob"));
    }

    #[tokio::test]
    async fn test_custom_failure_is_fatal() {
        let context = run(account(), name(), |r| {
            r.custom(|_| Err(ValidationFailure::rule("lookup table missing")))
                .mandatory()
        })
        .await;
        assert!(context.messages().is_empty());
        assert!(matches!(context.failure(), Some(ValidationFailure::Rule { .. })));
    }

    #[tokio::test]
    async fn test_custom_warning_does_not_stop_chain() {
        let context = run(account(), name(), |r| {
            r.custom(|pc| {
                pc.add_warning("{0} '{1}' looks short.", &[]);
                Ok(())
            })
            .min_length(5)
        })
        .await;
        let texts: Vec<_> = context.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Name 'bob' looks short.", "Name must be at least 5 characters in length."]
        );
    }

    #[tokio::test]
    async fn test_exists_not_found() {
        let context = run(account(), email(), |r| r.exists(|_: String| async { Ok(false) })).await;
        assert_eq!(
            only_error(&context),
            ("email", "Email is not found; a valid value is required.")
        );
    }

    #[tokio::test]
    async fn test_exists_lookup_error_is_fatal() {
        let context = run(account(), email(), |r| {
            r.exists(|_: String| async { Err(ValidationFailure::rule("directory offline")) })
        })
        .await;
        assert!(context.messages().is_empty());
        assert!(context.has_failed());
    }

    #[tokio::test]
    async fn test_exists_observes_cancellation() {
        let chain = PropertyRule::builder(email())
            .exists(|_: String| std::future::pending())
            .build();
        let mut context = ValidationContext::new(
            Some(account()),
            ValidationArgs::new(),
            Arc::new(ValidationDefaults::default()),
        );
        let cancel = CancellationToken::new();

        tokio::join!(chain.run(&mut context, &cancel), async {
            tokio::task::yield_now().await;
            cancel.cancel();
        });

        assert!(context.failure().is_some_and(ValidationFailure::is_cancelled));
    }

    #[tokio::test]
    async fn test_duplicate_and_immutable() {
        let context = run(account(), name(), |r| r.duplicate(|a: &Account| a.name == "bob")).await;
        assert_eq!(
            only_error(&context),
            ("name", "Name already exists and would result in a duplicate.")
        );

        let context = run(account(), name(), |r| r.immutable(|_: &Account| false)).await;
        assert_eq!(
            only_error(&context),
            ("name", "Name is not allowed to change; please reset value.")
        );
    }
}
