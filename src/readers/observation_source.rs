use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::models::SnapshotRow;
use crate::readers::snapshot_reader::{extract_embedded_json, parse_snapshot};

/// Supplies the current observation snapshot
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<SnapshotRow>>;
}

/// Scrapes the embedded observations table from the IPMA station page
pub struct IpmaSource {
    client: Client,
    url: String,
}

impl IpmaSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ReportError::SourceUnavailable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::SourceUnavailable(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ReportError::SourceUnavailable(format!("{}: {}", self.url, e)))
    }
}

#[async_trait]
impl ObservationSource for IpmaSource {
    async fn fetch_snapshot(&self) -> Result<Vec<SnapshotRow>> {
        info!(url = %self.url, "fetching observation snapshot");
        let page = self.fetch_page().await?;
        debug!(bytes = page.len(), "received source page");

        let rows = parse_snapshot(extract_embedded_json(&page)?)?;
        info!(rows = rows.len(), "parsed observation snapshot");
        Ok(rows)
    }
}

/// Snapshot held in memory: either a saved source page or the bare JSON object
pub struct StaticSource {
    content: String,
}

impl StaticSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::SourceUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::new(content))
    }
}

#[async_trait]
impl ObservationSource for StaticSource {
    async fn fetch_snapshot(&self) -> Result<Vec<SnapshotRow>> {
        let trimmed = self.content.trim_start();
        if trimmed.starts_with('{') {
            parse_snapshot(trimmed)
        } else {
            parse_snapshot(extract_embedded_json(&self.content)?)
        }
    }
}
