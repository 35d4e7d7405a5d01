use super::{parse_snapshot, MarketSnapshot};
use crate::config::SheetConfig;
use crate::Result;
use tracing::{debug, info};

/// HTTP client for the sheet export.
pub fn client(config: &SheetConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout())
        .build()?)
}

/// Download the CSV export.
///
/// Transport failures and non-2xx statuses are fatal; there is no retry.
pub async fn fetch_csv(client: &reqwest::Client, config: &SheetConfig) -> Result<String> {
    let url = config.export_url();
    info!("Fetching sheet: {}", url);

    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!("Sheet export: {} bytes", body.len());
    Ok(body)
}

/// Download the CSV export and parse the data row.
pub async fn fetch_snapshot(
    client: &reqwest::Client,
    config: &SheetConfig,
) -> Result<MarketSnapshot> {
    parse_snapshot(&fetch_csv(client, config).await?)
}
