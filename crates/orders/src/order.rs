use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use orderscan_core::{OrderId, SalesChannelId};

use crate::state::{DeliveryState, OrderState, TransactionState};

/// Tracking code reported for orders without any delivery tracking code.
pub const ABSENT_TRACKING_CODE: &str = "absent";

/// Delivery (shipment) attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDelivery {
    pub order_id: OrderId,
    pub state: DeliveryState,
    pub tracking_codes: Vec<String>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Payment transaction attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTransaction {
    pub order_id: OrderId,
    pub state: TransactionState,
    pub created_at: DateTime<FixedOffset>,
}

/// Generated document (invoice, delivery note, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDocument {
    pub file_type: String,
    pub file_name: Option<String>,
}

/// Order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: Option<String>,
    pub product_number: Option<String>,
}

/// Order aggregate snapshot.
///
/// Collections are kept in the order the backend returned them; "first delivery"
/// and "first document" therefore mean first as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub sales_channel_id: SalesChannelId,
    pub state: OrderState,
    /// Creation time in the backend's own offset.
    pub created_at: DateTime<FixedOffset>,
    pub deliveries: Vec<OrderDelivery>,
    pub transactions: Vec<OrderTransaction>,
    pub documents: Vec<OrderDocument>,
    pub line_items: Vec<LineItem>,
}

impl Order {
    pub fn new(
        id: OrderId,
        number: impl Into<String>,
        sales_channel_id: SalesChannelId,
        state: OrderState,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            sales_channel_id,
            state,
            created_at,
            deliveries: Vec::new(),
            transactions: Vec::new(),
            documents: Vec::new(),
            line_items: Vec::new(),
        }
    }

    pub fn with_delivery(mut self, state: DeliveryState, tracking_codes: Vec<String>) -> Self {
        self.deliveries.push(OrderDelivery {
            order_id: self.id.clone(),
            state,
            tracking_codes,
            updated_at: None,
        });
        self
    }

    pub fn with_transaction(
        mut self,
        state: TransactionState,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        self.transactions.push(OrderTransaction {
            order_id: self.id.clone(),
            state,
            created_at,
        });
        self
    }

    pub fn with_document(mut self, file_type: impl Into<String>) -> Self {
        self.documents.push(OrderDocument {
            file_type: file_type.into(),
            file_name: None,
        });
        self
    }

    pub fn first_delivery(&self) -> Option<&OrderDelivery> {
        self.deliveries.first()
    }

    pub fn first_document(&self) -> Option<&OrderDocument> {
        self.documents.first()
    }

    /// Most recently created transaction.
    ///
    /// Equal timestamps resolve to the one received last.
    pub fn latest_transaction(&self) -> Option<&OrderTransaction> {
        self.transactions.iter().max_by_key(|tx| tx.created_at)
    }

    /// First tracking code of the first delivery, or [`ABSENT_TRACKING_CODE`].
    pub fn tracking_code(&self) -> &str {
        self.first_delivery()
            .and_then(|d| d.tracking_codes.first())
            .map(String::as_str)
            .unwrap_or(ABSENT_TRACKING_CODE)
    }

    /// Calendar date of creation, in the offset the backend reported.
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}
