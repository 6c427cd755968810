use nebula_validation::invoker::{Invocation, RunSummary, ValidationInvoker};
use nebula_validation::prelude::*;
use nebula_validation::settings::ValidationSettings;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Product {
    id: i32,
    code: String,
    text: Option<String>,
}

impl FieldValue for Product {}

#[derive(Debug, Clone, Default, PartialEq)]
struct Customer {
    name: String,
    email: String,
}

impl FieldValue for Customer {}

#[derive(Debug, Clone, Default, PartialEq)]
struct Line {
    product: String,
    quantity: u32,
}

impl FieldValue for Line {}

#[derive(Debug, Clone, Default, PartialEq)]
struct Order {
    order_id: i64,
    customer: Option<Customer>,
    lines: Vec<Line>,
}

impl FieldValue for Order {}

fn paths<T>(context: &ValidationContext<T>) -> Vec<&str> {
    context
        .messages()
        .iter()
        .filter_map(|m| m.property.as_deref())
        .collect()
}

fn texts<T>(context: &ValidationContext<T>) -> Vec<&str> {
    context.messages().iter().map(|m| m.text.as_str()).collect()
}

fn product_validator() -> EntityValidator<Product> {
    EntityValidator::<Product>::builder()
        .property(Field::new("Id", |p: &Product| &p.id), |r| r.mandatory())
        .property(Field::new("Code", |p: &Product| &p.code), |r| r.mandatory().max_length(5))
        .property(Field::new("Text", |p: &Product| &p.text), |r| r.mandatory())
        .build()
}

fn customer_validator() -> Arc<EntityValidator<Customer>> {
    Arc::new(
        EntityValidator::<Customer>::builder()
            .property(field!(Customer, name), |r| r.mandatory())
            .property(field!(Customer, email), |r| r.mandatory().email())
            .build(),
    )
}

fn order_validator() -> EntityValidator<Order> {
    let line = Arc::new(
        EntityValidator::<Line>::builder()
            .property(field!(Line, product), |r| r.mandatory())
            .property(field!(Line, quantity), |r| r.between(1, 100))
            .build(),
    );
    let lines = Arc::new(
        CollectionValidator::<Vec<Line>>::builder()
            .min_count(1)
            .item(line)
            .build()
            .unwrap(),
    );

    EntityValidator::<Order>::builder()
        .property(field!(Order, order_id), |r| r.mandatory())
        .property(field!(Order, customer), |r| r.mandatory().entity(customer_validator()))
        .property(field!(Order, lines), |r| r.collection(lines))
        .build()
}

fn invalid_order() -> Order {
    Order {
        order_id: 7,
        customer: Some(Customer {
            name: String::new(),
            email: "someone@example.com".into(),
        }),
        lines: vec![
            Line {
                product: "widget".into(),
                quantity: 2,
            },
            Line {
                product: String::new(),
                quantity: 2,
            },
        ],
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_three_mandatory_errors() {
    let product = Product {
        id: 0,
        code: String::new(),
        text: None,
    };
    let cancel = CancellationToken::new();
    let context = product_validator()
        .validate_with(Some(product), ValidationArgs::new().use_wire_names(false), &cancel)
        .await;

    assert!(context.has_errors());
    assert_eq!(paths(&context), vec!["Id", "Code", "Text"]);
    assert_eq!(
        texts(&context),
        vec!["Id is required.", "Code is required.", "Text is required."]
    );
}

#[tokio::test]
async fn test_wire_names_by_default() {
    let context = product_validator().validate(Product::default()).await;
    assert_eq!(paths(&context), vec!["id", "code", "text"]);
}

#[tokio::test]
async fn test_valid_entity_round_trips() {
    let product = Product {
        id: 1,
        code: "ABC".into(),
        text: Some("A product".into()),
    };
    let context = product_validator().validate(product.clone()).await;

    assert!(context.to_error().is_none());
    let value: Product = context.into_result().unwrap();
    assert_eq!(value, product);
}

#[tokio::test]
async fn test_ensure_ok_carries_messages() {
    let context = product_validator().validate(Product::default()).await;
    let error = context.ensure_ok(false).unwrap_err();

    let validation = error.as_validation().expect("validation error");
    assert_eq!(validation.messages().len(), 3);
    assert!(validation.message_for("code").is_some());
}

#[tokio::test]
async fn test_absent_root_value() {
    let cancel = CancellationToken::new();
    let context = product_validator()
        .validate_with(None, ValidationArgs::new(), &cancel)
        .await;

    assert_eq!(paths(&context), vec!["value"]);
    assert_eq!(texts(&context), vec!["Value is required."]);
}

#[derive(Debug, Clone, Default)]
struct Recording(Arc<std::sync::Mutex<Vec<(&'static str, RunSummary)>>>);

#[async_trait::async_trait]
impl ValidationInvoker for Recording {
    async fn invoke<'a>(
        &self,
        invocation: Invocation,
        run: futures::future::BoxFuture<'a, RunSummary>,
    ) -> Result<RunSummary, ValidationFailure> {
        let summary = run.await;
        self.0.lock().unwrap().push((invocation.validator, summary));
        Ok(summary)
    }
}

#[tokio::test]
async fn test_absent_value_runs_through_invoker() {
    let recording = Recording::default();
    let validator = EntityValidator::<Product>::builder()
        .with_defaults(Arc::new(ValidationDefaults::default().with_invoker(recording.clone())))
        .property(field!(Product, code), |r| r.mandatory())
        .build();

    let cancel = CancellationToken::new();
    let context = validator
        .validate_with(None, ValidationArgs::new(), &cancel)
        .await;

    assert_eq!(texts(&context), vec!["Value is required."]);
    let seen = recording.0.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(
            "Product",
            RunSummary {
                messages: 1,
                has_errors: true,
                failed: false,
            }
        )]
    );
}

// ============================================================================
// CHAIN SEMANTICS
// ============================================================================

fn counting(counter: &Arc<AtomicUsize>, fail: bool) -> impl Fn(&mut PropertyContext<'_, Product, String>) -> Result<(), ValidationFailure> + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |pc| {
        counter.fetch_add(1, Ordering::SeqCst);
        if fail {
            pc.add_error("{0} failed.", &[]);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_first_error_wins_per_field() {
    let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let validator = EntityValidator::<Product>::builder()
        .property(field!(Product, code), |r| {
            r.custom(counting(&counters[0], true))
                .custom(counting(&counters[1], true))
                .custom(counting(&counters[2], false))
        })
        .property(field!(Product, id), |r| r.mandatory())
        .build();

    let context = validator.validate(Product::default()).await;

    let calls: Vec<_> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(calls, vec![1, 0, 0]);
    // sibling fields still run
    assert_eq!(paths(&context), vec!["code", "id"]);
}

#[tokio::test]
async fn test_rule_set_gating() {
    let counter = Arc::new(AtomicUsize::new(0));
    let validator = EntityValidator::<Product>::builder()
        .rule_set(
            |ctx| ctx.operation() == OperationType::Create,
            |rs| rs.property(field!(Product, code), |r| r.custom(counting(&counter, true)).mandatory()),
        )
        .build();

    let cancel = CancellationToken::new();
    let context = validator
        .validate_with(
            Some(Product::default()),
            ValidationArgs::new().with_operation(OperationType::Update),
            &cancel,
        )
        .await;
    assert!(context.messages().is_empty());
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let context = validator
        .validate_with(
            Some(Product::default()),
            ValidationArgs::new().with_operation(OperationType::Create),
            &cancel,
        )
        .await;
    assert_eq!(paths(&context), vec!["code"]);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[derive(Debug, Clone, Default)]
struct Five {
    a: i32,
    b: i32,
    c: i32,
    d: i32,
    e: i32,
}

impl FieldValue for Five {}

#[tokio::test]
async fn test_fatal_failure_short_circuits() {
    let counters: Vec<_> = (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let track = |index: usize, fatal: bool| {
        let counter = Arc::clone(&counters[index]);
        move |_: &mut PropertyContext<'_, Five, i32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            if fatal {
                Err(ValidationFailure::rule("lookup unavailable"))
            } else {
                Ok(())
            }
        }
    };

    let validator = EntityValidator::<Five>::builder()
        .property(field!(Five, a), |r| r.custom(track(0, false)))
        .property(field!(Five, b), |r| r.custom(track(1, true)))
        .property(field!(Five, c), |r| r.custom(track(2, false)))
        .property(field!(Five, d), |r| r.custom(track(3, false)))
        .property(field!(Five, e), |r| r.custom(track(4, false)))
        .on_validate(|ctx: &mut ValidationContext<Five>| {
            ctx.add_property_error("a", "hook ran");
            Ok(())
        })
        .build();

    let context = validator.validate(Five::default()).await;

    let calls: Vec<_> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(calls, vec![1, 1, 0, 0, 0]);
    assert!(matches!(
        context.failure(),
        Some(ValidationFailure::Rule { message }) if message == "lookup unavailable"
    ));
    assert!(context.messages().is_empty());
    assert!(matches!(context.to_error(), Some(Error::Failure(_))));
}

#[tokio::test]
async fn test_when_clause_and_depends_on() {
    let validator = EntityValidator::<Product>::builder()
        .property(field!(Product, code), |r| r.mandatory())
        .property(field!(Product, text), |r| {
            r.depends_on(&field!(Product, code)).mandatory()
        })
        .property(field!(Product, id), |r| {
            r.when(|p: &Product| p.code == "SPECIAL").greater_than(100)
        })
        .build();

    // code in error: text is skipped
    let context = validator.validate(Product::default()).await;
    assert_eq!(paths(&context), vec!["code"]);

    let product = Product {
        id: 5,
        code: "SPECIAL".into(),
        text: None,
    };
    let context = validator.validate(product).await;
    assert_eq!(paths(&context), vec!["text", "id"]);
}

// ============================================================================
// NESTING
// ============================================================================

#[tokio::test]
async fn test_nested_paths_are_deterministic() {
    let validator = order_validator();

    let first = validator.validate(invalid_order()).await;
    let second = validator.validate(invalid_order()).await;

    assert_eq!(paths(&first), vec!["customer.name", "lines[1].product"]);
    assert_eq!(paths(&first), paths(&second));
    assert_eq!(texts(&first), vec!["Name is required.", "Product is required."]);
}

#[tokio::test]
async fn test_native_nested_paths() {
    let cancel = CancellationToken::new();
    let context = order_validator()
        .validate_with(Some(invalid_order()), ValidationArgs::new().use_wire_names(false), &cancel)
        .await;
    assert_eq!(paths(&context), vec!["customer.name", "lines[1].product"]);
}

#[tokio::test]
async fn test_selected_property_limits_run() {
    let cancel = CancellationToken::new();
    let context = order_validator()
        .validate_with(
            Some(invalid_order()),
            ValidationArgs::new().with_selected_property("lines"),
            &cancel,
        )
        .await;
    assert_eq!(paths(&context), vec!["lines[1].product"]);
}

#[tokio::test]
async fn test_shallow_skips_nested_validation() {
    let cancel = CancellationToken::new();
    let order = Order {
        lines: Vec::new(),
        ..invalid_order()
    };
    let context = order_validator()
        .validate_with(Some(order), ValidationArgs::new().shallow(), &cancel)
        .await;

    // the nested customer is not validated, the collection count still is
    assert_eq!(paths(&context), vec!["lines"]);
    assert_eq!(texts(&context), vec!["Lines must have at least 1 item(s)."]);
}

#[tokio::test]
async fn test_depth_limit_is_fatal() {
    let settings: ValidationSettings = serde_json::from_str(r#"{ "max_depth": 0 }"#).unwrap();
    let defaults = Arc::new(ValidationDefaults::from_settings(&settings).unwrap());
    let validator = EntityValidator::<Order>::builder()
        .property(field!(Order, customer), |r| r.entity(customer_validator()))
        .with_defaults(defaults)
        .build();

    let context = validator.validate(invalid_order()).await;
    assert!(matches!(
        context.failure(),
        Some(ValidationFailure::DepthExceeded { depth: 1, max: 0 })
    ));
}

// ============================================================================
// BASE INCLUSION
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Party {
    display_name: String,
}

impl FieldValue for Party {}

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    party: Party,
    age: u32,
}

impl FieldValue for Person {}

impl Inherits<Party> for Person {
    fn base(&self) -> Option<&Party> {
        Some(&self.party)
    }

    fn base_mut(&mut self) -> Option<&mut Party> {
        Some(&mut self.party)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Organisation {
    party: Option<Party>,
}

impl FieldValue for Organisation {}

impl Inherits<Party> for Organisation {
    fn base(&self) -> Option<&Party> {
        self.party.as_ref()
    }

    fn base_mut(&mut self) -> Option<&mut Party> {
        self.party.as_mut()
    }
}

fn party_validator() -> Arc<EntityValidator<Party>> {
    Arc::new(
        EntityValidator::<Party>::builder()
            .property(field!(Party, display_name), |r| {
                r.default_value(|_: &Party| "Anonymous".to_owned()).max_length(5)
            })
            .build(),
    )
}

#[tokio::test]
async fn test_include_base_runs_at_same_level() {
    let validator = EntityValidator::<Person>::builder()
        .include_base(party_validator())
        .property(field!(Person, age), |r| r.between(18, 120))
        .build();

    let context = validator.validate(Person::default()).await;

    assert_eq!(paths(&context), vec!["displayName", "age"]);
    assert_eq!(
        texts(&context),
        vec![
            "Display name must not exceed 5 characters in length.",
            "Age must be between 18 and 120."
        ]
    );
    // the base default is written back into the subtype
    assert_eq!(
        context.value().map(|p| p.party.display_name.as_str()),
        Some("Anonymous")
    );
}

#[tokio::test]
async fn test_include_base_incompatible_view() {
    let validator = EntityValidator::<Organisation>::builder()
        .include_base(party_validator())
        .build();

    let context = validator.validate(Organisation::default()).await;
    assert!(matches!(
        context.failure(),
        Some(ValidationFailure::IncompatibleBase { .. })
    ));
}

// ============================================================================
// HOOKS
// ============================================================================

#[tokio::test]
async fn test_hooks_run_in_order() {
    let validator = EntityValidator::<Product>::builder()
        .property(field!(Product, code), |r| r.mandatory())
        .on_validate(|ctx: &mut ValidationContext<Product>| {
            if ctx.value().is_some_and(|p| p.id < 0) {
                ctx.add_property_error("id", "Id must not be negative.");
            }
            Ok(())
        })
        .additional(|ctx: &mut ValidationContext<Product>| {
            ctx.add_message(Message::info("additional checks ran"));
            Ok(())
        })
        .build();

    let product = Product {
        id: -1,
        code: "A".into(),
        text: None,
    };
    let context = validator.validate(product).await;

    assert_eq!(
        texts(&context),
        vec!["Id must not be negative.", "additional checks ran"]
    );
    assert_eq!(paths(&context), vec!["id"]);
}

struct RejectReserved {
    reserved: Arc<HashSet<String>>,
}

#[async_trait::async_trait]
impl EntityHook<Product> for RejectReserved {
    async fn call(
        &self,
        context: &mut ValidationContext<Product>,
        cancel: &CancellationToken,
    ) -> Result<(), ValidationFailure> {
        if cancel.is_cancelled() {
            return Err(ValidationFailure::Cancelled);
        }
        let reserved = context
            .value()
            .is_some_and(|p| self.reserved.contains(&p.code));
        if reserved {
            context.add_property_error("code", "Code is reserved.");
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_async_additional_hook() {
    let validator = EntityValidator::<Product>::builder()
        .additional_hook(RejectReserved {
            reserved: Arc::new(HashSet::from(["ADMIN".to_owned()])),
        })
        .build();

    let product = Product {
        code: "ADMIN".into(),
        ..Product::default()
    };
    let context = validator.validate(product).await;
    assert_eq!(paths(&context), vec!["code"]);
}

// ============================================================================
// CANCELLATION AND EXTERNAL CHECKS
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let counter = Arc::new(AtomicUsize::new(0));
    let validator = EntityValidator::<Product>::builder()
        .property(field!(Product, code), |r| r.custom(counting(&counter, false)))
        .build();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let context = validator
        .validate_with(Some(Product::default()), ValidationArgs::new(), &cancel)
        .await;

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(context.failure().is_some_and(ValidationFailure::is_cancelled));
    assert!(matches!(
        context.into_result::<Product>(),
        Err(Error::Failure(ValidationFailure::Cancelled))
    ));
}

#[tokio::test]
async fn test_exists_uses_external_lookup() {
    let known: Arc<HashSet<String>> = Arc::new(HashSet::from(["ABC".to_owned()]));
    let validator = EntityValidator::<Product>::builder()
        .property(field!(Product, code), move |r| {
            r.mandatory().exists(move |code: String| {
                let known = Arc::clone(&known);
                async move { Ok::<_, ValidationFailure>(known.contains(&code)) }
            })
        })
        .build();

    let found = validator
        .validate(Product {
            code: "ABC".into(),
            ..Product::default()
        })
        .await;
    assert!(found.messages().is_empty());

    let missing = validator
        .validate(Product {
            code: "XYZ".into(),
            ..Product::default()
        })
        .await;
    assert_eq!(
        texts(&missing),
        vec!["Code is not found; a valid value is required."]
    );
}

#[tokio::test]
async fn test_text_overrides_from_settings() {
    let settings: ValidationSettings = serde_json::from_str(
        r#"{ "use_wire_names": false, "texts": { "validation.mandatory": "{0} must be provided." } }"#,
    )
    .unwrap();
    let validator = EntityValidator::<Product>::builder()
        .property(field!(Product, code, "Product code"), |r| r.mandatory())
        .with_defaults(Arc::new(ValidationDefaults::from_settings(&settings).unwrap()))
        .build();

    let context = validator.validate(Product::default()).await;
    assert_eq!(paths(&context), vec!["code"]);
    assert_eq!(texts(&context), vec!["Product code must be provided."]);
}
