use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

use crate::error::{ReportError, Result};
use crate::models::StationInfo;

/// Resolves a station id to its display name and territory label
#[async_trait]
pub trait StationDirectory: Send + Sync {
    async fn lookup(&self, station_id: &str) -> Result<StationInfo>;
}

#[derive(Debug, Deserialize)]
struct FogosStation {
    location: Option<String>,
    #[serde(alias = "region")]
    place: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FogosResponse {
    Many(Vec<FogosStation>),
    Wrapped { data: Vec<FogosStation> },
    One(FogosStation),
}

impl FogosResponse {
    fn into_first(self) -> Option<FogosStation> {
        match self {
            FogosResponse::Many(stations) | FogosResponse::Wrapped { data: stations } => {
                stations.into_iter().next()
            }
            FogosResponse::One(station) => Some(station),
        }
    }
}

/// Station metadata from the fogos.pt weather stations API
pub struct FogosDirectory {
    client: Client,
    base_url: String,
}

impl FogosDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StationDirectory for FogosDirectory {
    async fn lookup(&self, station_id: &str) -> Result<StationInfo> {
        let url = format!("{}/v2/weather/stations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id", station_id)])
            .send()
            .await
            .map_err(|e| ReportError::lookup(station_id, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::lookup(
                station_id,
                format!("directory returned HTTP {}", status),
            ));
        }

        let body = response
            .json::<FogosResponse>()
            .await
            .map_err(|e| ReportError::lookup(station_id, format!("malformed response: {}", e)))?;

        let station = body
            .into_first()
            .ok_or_else(|| ReportError::lookup(station_id, "station not found"))?;

        let info = StationInfo::new(
            station_id,
            station.location.unwrap_or_default(),
            station.place,
        );
        info.validate()
            .map_err(|e| ReportError::lookup(station_id, format!("invalid station record: {}", e)))?;

        debug!(station_id, name = %info.display_name, "resolved station");
        Ok(info)
    }
}

/// Memoizes successful lookups for the lifetime of one run
pub struct CachedDirectory<D> {
    inner: D,
    cache: Mutex<HashMap<String, StationInfo>>,
}

impl<D: StationDirectory> CachedDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn cached(&self, station_id: &str) -> Option<StationInfo> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(station_id).cloned())
    }
}

#[async_trait]
impl<D: StationDirectory> StationDirectory for CachedDirectory<D> {
    async fn lookup(&self, station_id: &str) -> Result<StationInfo> {
        if let Some(info) = self.cached(station_id) {
            debug!(station_id, "station cache hit");
            return Ok(info);
        }

        let info = self.inner.lookup(station_id).await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(station_id.to_string(), info.clone());
        }
        Ok(info)
    }
}
