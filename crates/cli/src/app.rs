//! One scan run, from configuration to report.

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use orderscan_core::{DomainResult, TimeWindow};
use orderscan_infra::{
    AppConfig, Credentials, ScanConfig, ShopwareOrderSource, TokenRefreshConfig, TokenRefresher,
};
use orderscan_rules::common;
use orderscan_scan::{FilterRequest, ScanReport, ScanService};

/// The window ending at the last midnight before `now`, with the configured passes.
pub fn filter_request(scan: &ScanConfig, now: DateTime<Utc>) -> DomainResult<FilterRequest> {
    let window = TimeWindow::previous_days(now, scan.lookback_days)?;
    Ok(scan.filter_request(window))
}

/// Authenticate, scan and return the report.
///
/// The token refresher is stopped before returning, whatever the scan outcome.
pub async fn run(
    config: &AppConfig,
    now: DateTime<Utc>,
    cancel: CancellationToken,
) -> anyhow::Result<ScanReport> {
    let request = filter_request(&config.scan, now).context("building scan window")?;

    let http = reqwest::Client::builder()
        .timeout(config.shopware.request_timeout)
        .build()
        .context("building HTTP client")?;

    let refresher = TokenRefresher::start(
        http.clone(),
        &config.shopware.base_url,
        Credentials::new(
            config.shopware.client_id.clone(),
            config.shopware.client_secret.clone(),
        ),
        TokenRefreshConfig::default(),
    )
    .await
    .context("authenticating against Shopware")?;

    let source =
        ShopwareOrderSource::new(http, config.shopware.base_url.clone(), refresher.token());
    let engine = common::baseline().build();
    info!(
        from = %request.window.from(),
        to = %request.window.to(),
        passes = ?request.enabled_passes(),
        rules = ?engine.rule_names().collect::<Vec<_>>(),
        "scan started"
    );
    let service = ScanService::new(source, engine);

    let outcome = service.scan_orders(&request, &cancel).await;
    refresher.shutdown().await;

    let report = outcome.context("order scan failed")?;
    info!(
        scanned = report.scanned,
        failing = report.results.len(),
        "scan finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use orderscan_scan::ScanPass;

    #[test]
    fn default_config_scans_yesterday_with_all_passes() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 7, 30, 0).unwrap();
        let req = filter_request(&ScanConfig::default(), now).unwrap();

        assert_eq!(req.window.from(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(req.window.to() < Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
        assert_eq!(req.enabled_passes().len(), 4);
    }

    #[test]
    fn disabled_passes_stay_off() {
        let scan = ScanConfig {
            lookback_days: 7,
            include_created: false,
            include_updated: true,
            include_delivery_updated: false,
            include_transaction_updated: false,
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let req = filter_request(&scan, now).unwrap();

        assert_eq!(req.window.from(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(req.enabled_passes(), vec![ScanPass::Updated]);
    }
}
