//! Scan orchestration: passes, pagination, deduplication, evaluation.

use std::collections::HashSet;
use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use orderscan_core::{OrderId, TimeWindow};
use orderscan_orders::Order;
use orderscan_rules::RuleEngine;

use crate::ordering::sort_report;
use crate::report::{OrderResult, ScanReport};
use crate::request::{FilterRequest, ScanPass};
use crate::source::{MAX_PAGE_SIZE, OrderSource, PageRequest, SourceError, TimeField};

/// Scan failure. A failed scan never yields a partial report.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{pass} pass failed searching by {field} on page {page}: {source}")]
    Search {
        pass: ScanPass,
        field: TimeField,
        page: u32,
        #[source]
        source: SourceError,
    },

    #[error("{pass} pass failed looking up orders for page {page}: {source}")]
    Lookup {
        pass: ScanPass,
        page: u32,
        #[source]
        source: SourceError,
    },

    #[error("scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// The pass that was running when the scan failed, if any.
    pub fn pass(&self) -> Option<ScanPass> {
        match self {
            ScanError::Search { pass, .. } | ScanError::Lookup { pass, .. } => Some(*pass),
            ScanError::Cancelled => None,
        }
    }
}

/// Runs scans against an [`OrderSource`] with a fixed [`RuleEngine`].
///
/// The service itself holds no per-scan state; concurrent scans do not share
/// their processed sets or reports.
#[derive(Debug)]
pub struct ScanService<S> {
    source: S,
    engine: RuleEngine,
    page_size: usize,
}

impl<S: OrderSource> ScanService<S> {
    pub fn new(source: S, engine: RuleEngine) -> Self {
        Self {
            source,
            engine,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Override the page size (must match what the source actually serves).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Scan the requested window and return the failing orders in report order.
    ///
    /// Any source error, or cancellation through `cancel`, aborts the whole scan.
    pub async fn scan_orders(
        &self,
        request: &FilterRequest,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let mut scan = ScanState::default();

        for pass in request.enabled_passes() {
            if let Err(err) = self.run_pass(pass, request.window, &mut scan, cancel).await {
                if matches!(err, ScanError::Cancelled) {
                    warn!(pass = %pass, "scan cancelled");
                }
                return Err(err);
            }
        }

        Ok(scan.finish())
    }

    async fn run_pass(
        &self,
        pass: ScanPass,
        window: TimeWindow,
        scan: &mut ScanState,
        cancel: &CancellationToken,
    ) -> Result<(), ScanError> {
        let mut page = PageRequest::first(self.page_size);
        let mut fetched = 0usize;
        let mut pages = 0u32;

        loop {
            let (orders, last) = self.fetch_page(pass, window, page, cancel).await?;
            pages += 1;
            fetched += orders.len();
            scan.absorb(&self.engine, orders);

            if last {
                break;
            }
            page = page.next();
        }

        info!(pass = %pass, field = %pass.field(), pages, orders = fetched, "pass finished");
        Ok(())
    }

    /// One page of candidate orders and whether it was the last page.
    async fn fetch_page(
        &self,
        pass: ScanPass,
        window: TimeWindow,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Order>, bool), ScanError> {
        let field = pass.field();
        let search_err = |source| ScanError::Search {
            pass,
            field,
            page: page.number,
            source,
        };

        match pass {
            ScanPass::Created | ScanPass::Updated => {
                let orders = guarded(cancel, self.source.search_orders(field, window, page))
                    .await?
                    .map_err(search_err)?;
                let last = page.is_last(orders.len());
                Ok((orders, last))
            }
            ScanPass::DeliveryUpdated => {
                let deliveries = guarded(cancel, self.source.search_deliveries(field, window, page))
                    .await?
                    .map_err(search_err)?;
                // exhaustion is judged on the sub-record page, not on the orders it resolves to
                let last = page.is_last(deliveries.len());
                let ids = distinct(deliveries.into_iter().map(|d| d.order_id));
                Ok((self.lookup(pass, page, ids, cancel).await?, last))
            }
            ScanPass::TransactionUpdated => {
                let txs = guarded(cancel, self.source.search_transactions(field, window, page))
                    .await?
                    .map_err(search_err)?;
                let last = page.is_last(txs.len());
                let ids = distinct(txs.into_iter().map(|t| t.order_id));
                Ok((self.lookup(pass, page, ids, cancel).await?, last))
            }
        }
    }

    /// Bulk-fetch the orders referenced by a sub-record page.
    ///
    /// Referenced orders the backend no longer returns are skipped.
    async fn lookup(
        &self,
        pass: ScanPass,
        page: PageRequest,
        ids: Vec<OrderId>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Order>, ScanError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let orders = guarded(cancel, self.source.search_orders_by_ids(&ids))
            .await?
            .map_err(|source| ScanError::Lookup {
                pass,
                page: page.number,
                source,
            })?;

        let found: HashSet<&OrderId> = orders.iter().map(|o| &o.id).collect();
        let missing = ids.iter().filter(|id| !found.contains(id)).count();
        if missing > 0 {
            warn!(
                pass = %pass,
                page = page.number,
                missing,
                requested = ids.len(),
                "referenced orders not returned by lookup, skipping them"
            );
        }

        Ok(orders)
    }
}

/// Per-scan accumulation: processed identifiers and failing orders in discovery order.
#[derive(Debug, Default)]
struct ScanState {
    processed: HashSet<OrderId>,
    results: Vec<OrderResult>,
}

impl ScanState {
    fn absorb(&mut self, engine: &RuleEngine, orders: Vec<Order>) {
        for order in orders {
            // check-and-mark in one step: each id is evaluated at most once per scan
            if !self.processed.insert(order.id.clone()) {
                debug!(order_id = %order.id, "order already processed");
                continue;
            }

            let failures = engine.process_order(&order);
            if let Some(result) = OrderResult::from_failures(&order, failures) {
                self.results.push(result);
            }
        }
    }

    fn finish(mut self) -> ScanReport {
        sort_report(&mut self.results);
        ScanReport {
            results: self.results,
            scanned: self.processed.len(),
        }
    }
}

/// Await a source call unless the scan is cancelled first.
async fn guarded<T, F>(
    cancel: &CancellationToken,
    call: F,
) -> Result<Result<T, SourceError>, ScanError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScanError::Cancelled),
        res = call => Ok(res),
    }
}

/// Deduplicate while keeping first-seen order.
fn distinct(ids: impl IntoIterator<Item = OrderId>) -> Vec<OrderId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keeps_first_occurrence_order() {
        let ids = distinct(
            ["b", "a", "b", "c", "a"]
                .into_iter()
                .map(OrderId::new),
        );
        let raw: Vec<&str> = ids.iter().map(OrderId::as_str).collect();
        assert_eq!(raw, vec!["b", "a", "c"]);
    }
}
