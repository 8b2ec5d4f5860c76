use orderscan_orders::{DeliveryState, Order};

use crate::rule::{Rule, RuleOutcome};

/// A shipped delivery must carry a non-empty tracking code.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShippedTrackingCode;

impl Rule for ShippedTrackingCode {
    fn apply(&self, order: &Order) -> RuleOutcome {
        // pre-condition
        let Some(delivery) = order.first_delivery() else {
            return RuleOutcome::NotApplicable;
        };
        if delivery.state != DeliveryState::Shipped {
            return RuleOutcome::NotApplicable;
        }

        match delivery.tracking_codes.first() {
            None => RuleOutcome::failed("no tracking code"),
            Some(code) if code.is_empty() => RuleOutcome::failed("tracking code is empty"),
            Some(_) => RuleOutcome::Passed,
        }
    }
}
