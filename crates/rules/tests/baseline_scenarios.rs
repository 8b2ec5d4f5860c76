use std::sync::Arc;

use chrono::DateTime;
use orderscan_core::{OrderId, SalesChannelId};
use orderscan_orders::{DeliveryState, Order, OrderState, TransactionState};
use orderscan_rules::common::{self, DONE_SHIPPED, PDF_DOCUMENT, RETURN_REFUND_STATE, TRACKING_CODE};
use orderscan_rules::{InMemoryRuleSink, RuleOutcome};

fn order(id: &str, state: OrderState) -> Order {
    Order::new(
        OrderId::new(id),
        format!("N-{id}"),
        SalesChannelId::new("storefront"),
        state,
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00+01:00").unwrap(),
    )
}

#[test]
fn done_order_with_open_delivery_fails_done_shipped_only() {
    let engine = common::baseline().build();
    let o1 = order("O1", OrderState::Done).with_delivery(DeliveryState::Open, vec![]);

    let failures = engine.process_order(&o1);
    assert_eq!(failures.len(), 1);
    assert!(failures[DONE_SHIPPED].reason().contains("Open"));
}

#[test]
fn shipped_with_empty_code_and_no_document_fails_twice() {
    let engine = common::baseline().build();
    let o2 = order("O2", OrderState::InProgress)
        .with_delivery(DeliveryState::Shipped, vec![String::new()]);

    let failures = engine.process_order(&o2);
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[TRACKING_CODE].reason(), "tracking code is empty");
    assert_eq!(failures[PDF_DOCUMENT].reason(), "no document");
}

#[test]
fn order_without_deliveries_is_out_of_scope_for_shipping_rules() {
    let sink = Arc::new(InMemoryRuleSink::new());
    let engine = common::baseline().sink(sink.clone()).build();

    let failures = engine.process_order(&order("O9", OrderState::Open));
    assert!(failures.is_empty());

    let outcomes = sink.all();
    assert_eq!(outcomes.len(), 4);
    for name in [TRACKING_CODE, PDF_DOCUMENT] {
        let eval = outcomes.iter().find(|e| e.rule == name).unwrap();
        assert_eq!(eval.outcome, RuleOutcome::NotApplicable);
    }
}

#[test]
fn consistent_returned_order_passes_everything() {
    let engine = common::baseline().build();
    let o = order("O4", OrderState::Done)
        .with_delivery(DeliveryState::Returned, vec!["DHL-7".into()])
        .with_transaction(
            TransactionState::Refunded,
            DateTime::parse_from_rfc3339("2024-03-02T08:00:00+01:00").unwrap(),
        );

    let failures = engine.process_order(&o);
    assert!(failures.is_empty(), "unexpected failures: {failures:?}");
}

#[test]
fn custom_closure_rules_plug_in_next_to_baseline() {
    let engine = common::baseline()
        .rule("HAS_LINE_ITEMS", |o: &Order| {
            if o.line_items.is_empty() {
                RuleOutcome::failed("no line items")
            } else {
                RuleOutcome::Passed
            }
        })
        .build();

    assert_eq!(engine.len(), 5);
    let failures = engine.process_order(&order("O5", OrderState::Open));
    assert_eq!(failures.keys().collect::<Vec<_>>(), vec!["HAS_LINE_ITEMS"]);
    assert!(!failures.contains_key(RETURN_REFUND_STATE));
}
