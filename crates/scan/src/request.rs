use serde::{Deserialize, Serialize};

use orderscan_core::TimeWindow;

use crate::source::TimeField;

/// One discovery strategy for candidate orders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPass {
    /// Orders created within the window.
    Created,
    /// Orders updated within the window.
    Updated,
    /// Orders owning a delivery updated within the window.
    DeliveryUpdated,
    /// Orders owning a transaction updated within the window.
    TransactionUpdated,
}

impl ScanPass {
    pub fn field(&self) -> TimeField {
        match self {
            ScanPass::Created => TimeField::CreatedAt,
            _ => TimeField::UpdatedAt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPass::Created => "orders_created",
            ScanPass::Updated => "orders_updated",
            ScanPass::DeliveryUpdated => "deliveries_updated",
            ScanPass::TransactionUpdated => "transactions_updated",
        }
    }
}

impl core::fmt::Display for ScanPass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to scan: a time window and the passes to run over it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub window: TimeWindow,
    pub include_created: bool,
    pub include_updated: bool,
    pub include_delivery_updated: bool,
    pub include_transaction_updated: bool,
}

impl FilterRequest {
    /// A request with no pass enabled.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            include_created: false,
            include_updated: false,
            include_delivery_updated: false,
            include_transaction_updated: false,
        }
    }

    pub fn all_passes(window: TimeWindow) -> Self {
        Self {
            window,
            include_created: true,
            include_updated: true,
            include_delivery_updated: true,
            include_transaction_updated: true,
        }
    }

    pub fn with_pass(mut self, pass: ScanPass) -> Self {
        match pass {
            ScanPass::Created => self.include_created = true,
            ScanPass::Updated => self.include_updated = true,
            ScanPass::DeliveryUpdated => self.include_delivery_updated = true,
            ScanPass::TransactionUpdated => self.include_transaction_updated = true,
        }
        self
    }

    /// Enabled passes in execution order.
    pub fn enabled_passes(&self) -> Vec<ScanPass> {
        [
            (self.include_created, ScanPass::Created),
            (self.include_updated, ScanPass::Updated),
            (self.include_delivery_updated, ScanPass::DeliveryUpdated),
            (self.include_transaction_updated, ScanPass::TransactionUpdated),
        ]
        .into_iter()
        .filter_map(|(enabled, pass)| enabled.then_some(pass))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        TimeWindow::previous_days(Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap(), 1).unwrap()
    }

    #[test]
    fn passes_run_in_fixed_order() {
        let req = FilterRequest::new(window())
            .with_pass(ScanPass::TransactionUpdated)
            .with_pass(ScanPass::Created);
        assert_eq!(
            req.enabled_passes(),
            vec![ScanPass::Created, ScanPass::TransactionUpdated]
        );
        assert_eq!(FilterRequest::all_passes(window()).enabled_passes().len(), 4);
        assert!(FilterRequest::new(window()).enabled_passes().is_empty());
    }

    #[test]
    fn only_created_pass_filters_on_created_at() {
        assert_eq!(ScanPass::Created.field(), TimeField::CreatedAt);
        assert_eq!(ScanPass::DeliveryUpdated.field(), TimeField::UpdatedAt);
    }
}
