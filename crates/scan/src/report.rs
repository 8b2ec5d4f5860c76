use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use orderscan_core::{OrderId, SalesChannelId};
use orderscan_orders::Order;
use orderscan_rules::RuleFailures;

/// An order that failed at least one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub order_number: String,
    pub channel_id: SalesChannelId,
    pub tracking_code: String,
    pub created_date: NaiveDate,
    pub errors: RuleFailures,
}

impl OrderResult {
    /// `None` when the order has no failures: passing orders are never reported.
    pub fn from_failures(order: &Order, errors: RuleFailures) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        Some(Self {
            order_id: order.id.clone(),
            order_number: order.number.clone(),
            channel_id: order.sales_channel_id.clone(),
            tracking_code: order.tracking_code().to_string(),
            created_date: order.created_date(),
            errors,
        })
    }

    pub fn failure_count(&self) -> usize {
        self.errors.len()
    }
}

/// Outcome of one scan: failing orders in report order plus the number of
/// distinct orders inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub results: Vec<OrderResult>,
    pub scanned: usize,
}
