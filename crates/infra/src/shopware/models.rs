//! Admin API wire format.
//!
//! The backend sends `null` for empty collections and omits associations it
//! was not asked for; both decode as empty here.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use orderscan_core::{OrderId, SalesChannelId};
use orderscan_orders::{
    DeliveryState, LineItem, Order, OrderDelivery, OrderDocument, OrderState, OrderTransaction,
    TransactionState,
};

// ---- requests ----

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub page: u32,
    pub limit: usize,
    pub filter: Vec<Filter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum Filter<'a> {
    Range {
        field: &'a str,
        parameters: RangeParameters,
    },
    EqualsAny {
        field: &'a str,
        value: Vec<&'a str>,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct RangeParameters {
    pub gte: String,
    pub lte: String,
}

/// Associations loaded with every order search.
pub(crate) fn order_associations() -> Value {
    json!({
        "deliveries": [],
        "transactions": [],
        "documents": [],
        "lineItems": [],
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'static str,
}

// ---- responses ----

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Seconds.
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct SearchResponse<T> {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct StateMachineState {
    #[serde(default)]
    name: String,
}

fn state_name(state: Option<StateMachineState>) -> String {
    state.map(|s| s.name).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireOrder {
    id: String,
    sales_channel_id: String,
    order_number: String,
    #[serde(default)]
    state_machine_state: Option<StateMachineState>,
    created_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_empty")]
    deliveries: Vec<WireDelivery>,
    #[serde(default, deserialize_with = "null_as_empty")]
    transactions: Vec<WireTransaction>,
    #[serde(default, deserialize_with = "null_as_empty")]
    documents: Vec<WireDocument>,
    #[serde(default, deserialize_with = "null_as_empty")]
    line_items: Vec<WireLineItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireDelivery {
    order_id: String,
    #[serde(default)]
    state_machine_state: Option<StateMachineState>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tracking_codes: Vec<String>,
    #[serde(default)]
    updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTransaction {
    order_id: String,
    #[serde(default)]
    state_machine_state: Option<StateMachineState>,
    created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    #[serde(default)]
    file_type: Option<String>,
    #[serde(default)]
    config: Option<WireDocumentConfig>,
}

#[derive(Debug, Deserialize)]
struct WireDocumentConfig {
    #[serde(default)]
    custom: Option<WireDocumentCustom>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocumentCustom {
    #[serde(default)]
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLineItem {
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    payload: Option<WireLineItemPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLineItemPayload {
    #[serde(default)]
    product_number: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---- conversions ----

impl From<WireOrder> for Order {
    fn from(wire: WireOrder) -> Self {
        Order {
            id: OrderId::new(wire.id),
            number: wire.order_number,
            sales_channel_id: SalesChannelId::new(wire.sales_channel_id),
            state: OrderState::from(state_name(wire.state_machine_state)),
            created_at: wire.created_at,
            deliveries: wire.deliveries.into_iter().map(Into::into).collect(),
            transactions: wire.transactions.into_iter().map(Into::into).collect(),
            documents: wire.documents.into_iter().map(Into::into).collect(),
            line_items: wire.line_items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WireDelivery> for OrderDelivery {
    fn from(wire: WireDelivery) -> Self {
        OrderDelivery {
            order_id: OrderId::new(wire.order_id),
            state: DeliveryState::from(state_name(wire.state_machine_state)),
            tracking_codes: wire.tracking_codes,
            updated_at: wire.updated_at,
        }
    }
}

impl From<WireTransaction> for OrderTransaction {
    fn from(wire: WireTransaction) -> Self {
        OrderTransaction {
            order_id: OrderId::new(wire.order_id),
            state: TransactionState::from(state_name(wire.state_machine_state)),
            created_at: wire.created_at,
        }
    }
}

impl From<WireDocument> for OrderDocument {
    fn from(wire: WireDocument) -> Self {
        OrderDocument {
            file_type: wire.file_type.unwrap_or_default(),
            file_name: wire
                .config
                .and_then(|c| c.custom)
                .and_then(|c| c.file_name),
        }
    }
}

impl From<WireLineItem> for LineItem {
    fn from(wire: WireLineItem) -> Self {
        LineItem {
            product_id: wire.product_id,
            product_number: wire.payload.and_then(|p| p.product_number),
        }
    }
}
