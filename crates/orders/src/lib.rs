//! Order aggregate as fetched from the commerce backend.
//!
//! Orders are read-only snapshots: the scanner never mutates them, it only
//! inspects deliveries, transactions and documents attached to them.

pub mod order;
pub mod state;

pub use order::{
    ABSENT_TRACKING_CODE, LineItem, Order, OrderDelivery, OrderDocument, OrderTransaction,
};
pub use state::{DeliveryState, OrderState, TransactionState};
