use std::io::Write;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use orderscan_infra::AppConfig;
use orderscan_infra::config::DEFAULT_ENV_FILE;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(DEFAULT_ENV_FILE).context("loading configuration")?;
    orderscan_observability::init_with(config.log_format);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling scan");
                cancel.cancel();
            }
        }
    });

    let report = orderscan_cli::app::run(&config, chrono::Utc::now(), cancel).await?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("writing report")?;
    writeln!(stdout)?;
    Ok(())
}
