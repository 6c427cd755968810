//! Basic usage example for nebula-validation
//!
//! Run with `RUST_LOG` unset; the subscriber prints validator spans at debug.

use nebula_validation::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Customer {
    name: String,
    email: String,
}

impl FieldValue for Customer {}

#[derive(Debug, Clone, Default)]
struct Line {
    product: String,
    quantity: u32,
}

impl FieldValue for Line {}

#[derive(Debug, Clone, Default)]
struct Order {
    order_id: i64,
    customer: Option<Customer>,
    lines: Vec<Line>,
}

impl FieldValue for Order {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let customer = Arc::new(
        EntityValidator::<Customer>::builder()
            .property(field!(Customer, name), |r| r.mandatory().max_length(50))
            .property(field!(Customer, email), |r| r.mandatory().email())
            .build(),
    );
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
            .duplicate_check_by("Product", |l: &Line| l.product.clone())
            .build()?,
    );

    let orders = EntityValidator::<Order>::builder()
        .property(field!(Order, order_id), |r| r.mandatory())
        .property(field!(Order, customer), |r| r.mandatory().entity(customer))
        .property(field!(Order, lines), |r| r.collection(lines))
        .build();

    let order = Order {
        order_id: 42,
        customer: Some(Customer {
            name: "Ada".into(),
            email: "not-an-address".into(),
        }),
        lines: vec![
            Line {
                product: "widget".into(),
                quantity: 0,
            },
            Line {
                product: String::new(),
                quantity: 3,
            },
        ],
    };

    let context = orders.validate(order).await;
    for message in context.messages() {
        println!("{message}");
    }

    match context.ensure_ok(false) {
        Ok(_) => println!("\norder is valid"),
        Err(error) => println!("\n{error}"),
    }
    Ok(())
}
