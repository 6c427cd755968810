use nebula_validation::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq)]
struct Rate {
    currency: String,
    amount: i64,
}

impl FieldValue for Rate {}

fn rate(currency: &str, amount: i64) -> Rate {
    Rate {
        currency: currency.into(),
        amount,
    }
}

fn rate_validator() -> Arc<EntityValidator<Rate>> {
    Arc::new(
        EntityValidator::<Rate>::builder()
            .property(field!(Rate, currency), |r| r.mandatory().length(3, 3))
            .property(field!(Rate, amount), |r| r.greater_than(0))
            .build(),
    )
}

fn code_validator() -> Arc<CommonValidator<String>> {
    Arc::new(
        CommonValidator::<String>::builder()
            .rules(|r| r.max_length(4))
            .text("Code")
            .build(),
    )
}

fn rendered<T>(context: &ValidationContext<T>) -> Vec<(String, String)> {
    context
        .messages()
        .iter()
        .map(|m| (m.property.clone().unwrap_or_default(), m.text.clone()))
        .collect()
}

async fn run<D: Entries>(validator: &DictionaryValidator<D>, value: D) -> ValidationContext<D> {
    let cancel = CancellationToken::new();
    validator
        .validate_with(Some(value), ValidationArgs::new().with_path("rates", "rates"), &cancel)
        .await
}

// ============================================================================
// NULLS AND COUNTS
// ============================================================================

#[tokio::test]
async fn test_null_value_reported_once() {
    let validator = DictionaryValidator::<HashMap<String, Option<Rate>>>::builder()
        .value(rate_validator())
        .build()
        .unwrap();

    let rates = HashMap::from([("a".to_owned(), None)]);
    let context = run(&validator, rates).await;

    assert_eq!(
        rendered(&context),
        vec![(
            "rates".to_owned(),
            "Rates contains one or more values that are not specified.".to_owned()
        )]
    );
}

#[tokio::test]
async fn test_null_values_allowed() {
    let validator = DictionaryValidator::<BTreeMap<String, Option<Rate>>>::builder()
        .allow_null_values(true)
        .build()
        .unwrap();

    let rates = BTreeMap::from([("a".to_owned(), None), ("b".to_owned(), None)]);
    let context = run(&validator, rates).await;
    assert!(context.messages().is_empty());
}

#[tokio::test]
async fn test_null_key_reported() {
    let validator = DictionaryValidator::<BTreeMap<Option<String>, i32>>::builder()
        .build()
        .unwrap();

    let entries = BTreeMap::from([(None, 1), (Some("b".to_owned()), 2)]);
    let context = run(&validator, entries).await;

    assert_eq!(
        rendered(&context),
        vec![(
            "rates".to_owned(),
            "Rates contains one or more keys that are not specified.".to_owned()
        )]
    );
}

#[tokio::test]
async fn test_count_limits() {
    let validator = DictionaryValidator::<BTreeMap<String, i32>>::builder()
        .min_count(1)
        .max_count(2)
        .text("Exchange rates")
        .build()
        .unwrap();

    let empty = run(&validator, BTreeMap::new()).await;
    assert_eq!(
        rendered(&empty),
        vec![(
            "rates".to_owned(),
            "Exchange rates must have at least 1 item(s).".to_owned()
        )]
    );

    let full = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2), ("c".to_owned(), 3)]);
    let context = run(&validator, full).await;
    assert_eq!(
        rendered(&context),
        vec![(
            "rates".to_owned(),
            "Exchange rates must not exceed 2 item(s).".to_owned()
        )]
    );
}

#[test]
fn test_inverted_count_range_is_rejected() {
    let result = DictionaryValidator::<BTreeMap<String, i32>>::builder()
        .min_count(3)
        .max_count(1)
        .build();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidCountRange { min: 3, max: 1 })
    ));
}

// ============================================================================
// KEYS AND VALUES
// ============================================================================

#[tokio::test]
async fn test_entry_paths_use_key() {
    let validator = DictionaryValidator::<BTreeMap<String, Rate>>::builder()
        .key(code_validator())
        .value(rate_validator())
        .build()
        .unwrap();

    let rates = BTreeMap::from([
        ("eur".to_owned(), rate("EUR", 1)),
        ("nzd".to_owned(), rate("NZ", 0)),
        ("toolong".to_owned(), rate("USD", 2)),
    ]);
    let context = run(&validator, rates).await;

    assert_eq!(
        rendered(&context),
        vec![
            (
                "rates[nzd].currency".to_owned(),
                "Currency must be exactly 3 characters in length.".to_owned()
            ),
            (
                "rates[nzd].amount".to_owned(),
                "Amount must be greater than 0.".to_owned()
            ),
            (
                "rates[toolong]".to_owned(),
                "Code must not exceed 4 characters in length.".to_owned()
            ),
        ]
    );
}

#[tokio::test]
async fn test_shallow_skips_entries() {
    let validator = DictionaryValidator::<BTreeMap<String, Rate>>::builder()
        .value(rate_validator())
        .min_count(2)
        .build()
        .unwrap();

    let cancel = CancellationToken::new();
    let context = validator
        .validate_with(
            Some(BTreeMap::from([("x".to_owned(), rate("", 0))])),
            ValidationArgs::new().shallow(),
            &cancel,
        )
        .await;

    assert_eq!(
        rendered(&context),
        vec![("value".to_owned(), "Value must have at least 2 item(s).".to_owned())]
    );
}

// ============================================================================
// FATAL FAILURE AND CANCELLATION
// ============================================================================

fn counted_amounts(calls: &Arc<AtomicUsize>) -> Arc<CommonValidator<i32>> {
    let calls = Arc::clone(calls);
    Arc::new(
        CommonValidator::<i32>::builder()
            .rules(move |r| {
                r.custom(move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .build(),
    )
}

#[tokio::test]
async fn test_fatal_key_failure_stops_before_values() {
    let key_calls = Arc::new(AtomicUsize::new(0));
    let value_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&key_calls);
    let keys = Arc::new(
        CommonValidator::<String>::builder()
            .rules(move |r| {
                r.custom(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ValidationFailure::rule("currency table unavailable"))
                })
            })
            .build(),
    );
    let validator = DictionaryValidator::<BTreeMap<String, i32>>::builder()
        .min_count(5)
        .key(keys)
        .value(counted_amounts(&value_calls))
        .build()
        .unwrap();

    let entries = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);
    let context = run(&validator, entries).await;

    assert_eq!(key_calls.load(Ordering::SeqCst), 1);
    assert_eq!(value_calls.load(Ordering::SeqCst), 0);
    assert!(context.messages().is_empty());
    assert!(context.has_failed());
}

#[tokio::test]
async fn test_key_runs_before_value() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen = Arc::clone(&order);
    let keys = Arc::new(
        CommonValidator::<String>::builder()
            .rules(move |r| {
                r.custom(move |pc| {
                    seen.lock().unwrap().push(format!("key {}", pc.value()));
                    Ok(())
                })
            })
            .build(),
    );
    let seen = Arc::clone(&order);
    let values = Arc::new(
        CommonValidator::<i32>::builder()
            .rules(move |r| {
                r.custom(move |pc| {
                    seen.lock().unwrap().push(format!("value {}", pc.value()));
                    Ok(())
                })
            })
            .build(),
    );
    let validator = DictionaryValidator::<BTreeMap<String, i32>>::builder()
        .key(keys)
        .value(values)
        .build()
        .unwrap();

    let entries = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);
    run(&validator, entries).await;

    assert_eq!(*order.lock().unwrap(), vec!["key a", "value 1", "key b", "value 2"]);
}

#[tokio::test]
async fn test_cancellation_mid_walk() {
    let cancel = CancellationToken::new();
    let key_calls = Arc::new(AtomicUsize::new(0));
    let value_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&key_calls);
    let token = cancel.clone();
    let keys = Arc::new(
        CommonValidator::<String>::builder()
            .rules(move |r| {
                r.custom(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    token.cancel();
                    Ok(())
                })
            })
            .build(),
    );
    let validator = DictionaryValidator::<BTreeMap<String, i32>>::builder()
        .min_count(5)
        .key(keys)
        .value(counted_amounts(&value_calls))
        .build()
        .unwrap();

    let entries = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);
    let context = validator
        .validate_with(Some(entries), ValidationArgs::new().with_path("rates", "rates"), &cancel)
        .await;

    assert_eq!(key_calls.load(Ordering::SeqCst), 1);
    assert_eq!(value_calls.load(Ordering::SeqCst), 0);
    assert!(context.messages().is_empty());
    assert!(context.failure().is_some_and(ValidationFailure::is_cancelled));
}
