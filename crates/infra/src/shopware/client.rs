use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use orderscan_core::{OrderId, TimeWindow};
use orderscan_orders::{Order, OrderDelivery, OrderTransaction};
use orderscan_scan::{MAX_PAGE_SIZE, OrderSource, PageRequest, SourceError, TimeField};

use super::models::{
    Filter, RangeParameters, SearchRequest, SearchResponse, WireDelivery, WireOrder,
    WireTransaction, order_associations,
};
use super::response::{decode, transport};
use super::token::{SharedToken, TokenProvider};

/// Timestamp format the search API expects in range filters (UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ORDER_SEARCH: &str = "/api/v3/search/order";
const DELIVERY_SEARCH: &str = "/api/v3/search/order-delivery";
const TRANSACTION_SEARCH: &str = "/api/v3/search/order-transaction";

/// [`OrderSource`] backed by the Shopware Admin API search endpoints.
#[derive(Debug, Clone)]
pub struct ShopwareOrderSource<T = SharedToken> {
    http: reqwest::Client,
    base_url: String,
    token: T,
}

impl<T: TokenProvider> ShopwareOrderSource<T> {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: T) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn search<W>(&self, path: &str, body: &SearchRequest<'_>) -> Result<Vec<W>, SourceError>
    where
        W: DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(self.token.token())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let page: SearchResponse<W> = decode(resp).await?;
        debug!(
            path,
            page = body.page,
            total = ?page.total,
            returned = page.data.len(),
            "search page"
        );
        Ok(page.data)
    }
}

fn range<'a>(field: TimeField, window: &TimeWindow) -> Filter<'a> {
    Filter::Range {
        field: field.as_str(),
        parameters: RangeParameters {
            gte: format_time(window.from()),
            lte: format_time(window.to()),
        },
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

#[async_trait::async_trait]
impl<T: TokenProvider> OrderSource for ShopwareOrderSource<T> {
    async fn search_orders(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<Order>, SourceError> {
        let body = SearchRequest {
            page: page.number,
            limit: page.size,
            filter: vec![range(field, &window)],
            associations: Some(order_associations()),
        };
        let orders: Vec<WireOrder> = self.search(ORDER_SEARCH, &body).await?;
        Ok(orders.into_iter().map(Into::into).collect())
    }

    async fn search_orders_by_ids(&self, ids: &[OrderId]) -> Result<Vec<Order>, SourceError> {
        let mut orders = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let body = SearchRequest {
                page: 1,
                limit: MAX_PAGE_SIZE,
                filter: vec![Filter::EqualsAny {
                    field: "id",
                    value: chunk.iter().map(OrderId::as_str).collect(),
                }],
                associations: Some(order_associations()),
            };
            let found: Vec<WireOrder> = self.search(ORDER_SEARCH, &body).await?;
            orders.extend(found.into_iter().map(Order::from));
        }
        Ok(orders)
    }

    async fn search_deliveries(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<OrderDelivery>, SourceError> {
        let body = SearchRequest {
            page: page.number,
            limit: page.size,
            filter: vec![range(field, &window)],
            associations: None,
        };
        let deliveries: Vec<WireDelivery> = self.search(DELIVERY_SEARCH, &body).await?;
        Ok(deliveries.into_iter().map(Into::into).collect())
    }

    async fn search_transactions(
        &self,
        field: TimeField,
        window: TimeWindow,
        page: PageRequest,
    ) -> Result<Vec<OrderTransaction>, SourceError> {
        let body = SearchRequest {
            page: page.number,
            limit: page.size,
            filter: vec![range(field, &window)],
            associations: None,
        };
        let txs: Vec<WireTransaction> = self.search(TRANSACTION_SEARCH, &body).await?;
        Ok(txs.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn range_uses_backend_time_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 7, 0, 0).unwrap();
        let window = TimeWindow::previous_days(now, 1).unwrap();
        match range(TimeField::UpdatedAt, &window) {
            Filter::Range { field, parameters } => {
                assert_eq!(field, "updatedAt");
                assert_eq!(parameters.gte, "2024-03-01 00:00:00");
                assert_eq!(parameters.lte, "2024-03-01 23:59:59");
            }
            other => panic!("unexpected filter {other:?}"),
        }
    }
}
