use orderscan_orders::{DeliveryState, Order, OrderState};

use crate::rule::{Rule, RuleOutcome};

/// A completed order must have a delivery that left the `Open` state.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoneDeliveryNotOpen;

impl Rule for DoneDeliveryNotOpen {
    fn apply(&self, order: &Order) -> RuleOutcome {
        // pre-condition
        if order.state != OrderState::Done {
            return RuleOutcome::NotApplicable;
        }

        let Some(delivery) = order.first_delivery() else {
            return RuleOutcome::failed("no deliveries");
        };
        if delivery.state == DeliveryState::Open {
            return RuleOutcome::failed(format!(
                "wrong delivery state [{}] when shipped",
                delivery.state
            ));
        }

        RuleOutcome::Passed
    }
}
