//! Boundary to the upstream commerce backend.
//!
//! The scan only knows this trait; HTTP clients, fakes and caches live behind it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderscan_core::{OrderId, TimeWindow};
use orderscan_orders::{Order, OrderDelivery, OrderTransaction};

/// Largest page the backend serves; a shorter page means the results are exhausted.
pub const MAX_PAGE_SIZE: usize = 500;

/// Timestamp field a time-range search filters on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeField {
    CreatedAt,
    UpdatedAt,
}

impl TimeField {
    /// Field name as understood by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeField::CreatedAt => "createdAt",
            TimeField::UpdatedAt => "updatedAt",
        }
    }
}

impl core::fmt::Display for TimeField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a search (1-indexed).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub number: u32,
    pub size: usize,
}

impl PageRequest {
    pub fn first(size: usize) -> Self {
        Self { number: 1, size }
    }

    pub fn next(self) -> Self {
        Self {
            number: self.number + 1,
            size: self.size,
        }
    }

    /// Whether a page holding `len` records is the last one.
    pub fn is_last(&self, len: usize) -> bool {
        len < self.size
    }
}

/// Order source failure.
///
/// All variants are fatal to a running scan; retrying is the source's own business.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("unexpected response code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("access token unavailable: {0}")]
    Token(String),
}

/// Paginated search over orders and their sub-records.
#[async_trait::async_trait]
pub trait OrderSource: Send + Sync {
    /// Orders whose `field` lies within `window`, with deliveries, transactions,
    /// documents and line items attached.
    async fn search_orders(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<Order>, SourceError>;

    /// Full orders for the given identifiers. Unknown identifiers are simply absent.
    async fn search_orders_by_ids(&self, ids: &[OrderId]) -> Result<Vec<Order>, SourceError>;

    async fn search_deliveries(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<OrderDelivery>, SourceError>;

    async fn search_transactions(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<OrderTransaction>, SourceError>;
}

#[async_trait::async_trait]
impl<T> OrderSource for std::sync::Arc<T>
where
    T: OrderSource + ?Sized,
{
    async fn search_orders(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<Order>, SourceError> {
        (**self).search_orders(field, window, page).await
    }

    async fn search_orders_by_ids(&self, ids: &[OrderId]) -> Result<Vec<Order>, SourceError> {
        (**self).search_orders_by_ids(ids).await
    }

    async fn search_deliveries(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<OrderDelivery>, SourceError> {
        (**self).search_deliveries(field, window, page).await
    }

    async fn search_transactions(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<OrderTransaction>, SourceError> {
        (**self).search_transactions(field, window, page).await
    }
}
