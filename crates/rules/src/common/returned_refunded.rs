use orderscan_orders::{DeliveryState, Order, TransactionState};

use crate::rule::{Rule, RuleOutcome};

/// A returned delivery must be matched by a refunded payment.
///
/// - `Returned` requires the latest transaction to be `Refunded`.
/// - `Returned (partially)` requires `Refunded (partially)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnedRefundedState;

impl Rule for ReturnedRefundedState {
    fn apply(&self, order: &Order) -> RuleOutcome {
        // pre-conditions
        let Some(delivery) = order.first_delivery() else {
            return RuleOutcome::NotApplicable;
        };
        let expected = match delivery.state {
            DeliveryState::Returned => TransactionState::Refunded,
            DeliveryState::ReturnedPartially => TransactionState::RefundedPartially,
            _ => return RuleOutcome::NotApplicable,
        };

        let Some(tx) = order.latest_transaction() else {
            return RuleOutcome::failed("no transactions");
        };
        if tx.state != expected {
            return RuleOutcome::failed(format!(
                "wrong payment state [{}] expected [{}]",
                tx.state, expected
            ));
        }

        RuleOutcome::Passed
    }
}
