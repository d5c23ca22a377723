use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result};
use crate::models::{Observation, Readings, SnapshotRow, Territory};
use crate::readers::StationDirectory;
use crate::utils::constants::OBSERVATIONS_MARKER;

fn observations_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)var observations\s*=\s*(\{.*?\})\s*;")
            .expect("observations pattern is a valid regex")
    })
}

/// Extract the JSON object assigned to `var observations` in the source page
pub fn extract_embedded_json(page: &str) -> Result<&str> {
    observations_pattern()
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            ReportError::SourceUnavailable(format!(
                "'{}' not found in source page ({} bytes)",
                OBSERVATIONS_MARKER,
                page.len()
            ))
        })
}

/// Parse `{date-key: {station-id: record | null}}` into rows, keeping document order.
pub fn parse_snapshot(json: &str) -> Result<Vec<SnapshotRow>> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| ReportError::SourceUnavailable(format!("Malformed snapshot JSON: {}", e)))?;

    let days = root.as_object().ok_or_else(|| {
        ReportError::SourceUnavailable("Snapshot root is not a JSON object".to_string())
    })?;

    let mut rows = Vec::new();
    for (date_key, stations) in days {
        let date = parse_date_key(date_key)?;

        let stations = stations.as_object().ok_or_else(|| {
            ReportError::SourceUnavailable(format!(
                "Snapshot entry for '{}' is not a JSON object",
                date_key
            ))
        })?;

        for (station_id, record) in stations {
            if record.is_null() {
                debug!(station_id = %station_id, %date, "skipping null station record");
                continue;
            }

            let readings = Readings::deserialize(record).map_err(|e| {
                ReportError::SourceUnavailable(format!(
                    "Malformed record for station {} on {}: {}",
                    station_id, date, e
                ))
            })?;

            let territory_label = ["territory", "regiao"]
                .iter()
                .find_map(|key| record.get(*key).and_then(Value::as_str))
                .map(str::to_string);

            rows.push(SnapshotRow {
                station_id: station_id.clone(),
                date,
                territory_label,
                readings,
            });
        }
    }

    Ok(rows)
}

/// Date keys are either `YYYY-MM-DD` or `YYYY-MM-DDThh:mm`
fn parse_date_key(key: &str) -> Result<NaiveDate> {
    let day = key.get(..10).unwrap_or(key);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
        ReportError::SourceUnavailable(format!("Invalid snapshot date key '{}': {}", key, e))
    })
}

pub fn filter_by_date(rows: Vec<SnapshotRow>, date: NaiveDate) -> Vec<SnapshotRow> {
    rows.into_iter().filter(|row| row.date == date).collect()
}

/// Label each row with its territory. Rows without a label in the snapshot are
/// labelled from the station directory. Rows whose territory stays unknown,
/// including stations the directory cannot resolve, are dropped.
pub async fn assign_territories(
    rows: Vec<SnapshotRow>,
    directory: &dyn StationDirectory,
) -> Result<Vec<Observation>> {
    let mut observations = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let label = match row.territory_label {
            Some(label) => Some(label),
            None => match directory.lookup(&row.station_id).await {
                Ok(info) => info.territory_label,
                Err(ReportError::LookupFailure { reason, .. }) => {
                    warn!(
                        station_id = %row.station_id,
                        %reason,
                        "station not in directory, territory unknown"
                    );
                    None
                }
                Err(e) => return Err(e),
            },
        };

        match label.as_deref().and_then(Territory::from_label) {
            Some(territory) => observations.push(Observation {
                station_id: row.station_id,
                date: row.date,
                territory,
                readings: row.readings,
            }),
            None => {
                dropped += 1;
                warn!(
                    station_id = %row.station_id,
                    label = ?label,
                    "excluding station with unknown territory"
                );
            }
        }
    }

    if dropped > 0 {
        info!(dropped, kept = observations.len(), "rows without a known territory");
    }
    Ok(observations)
}

/// Group observations by territory, preserving snapshot order within each group.
pub fn partition_by_territory(
    observations: Vec<Observation>,
) -> BTreeMap<Territory, Vec<Observation>> {
    let mut partitions: BTreeMap<Territory, Vec<Observation>> = BTreeMap::new();
    for observation in observations {
        partitions
            .entry(observation.territory)
            .or_default()
            .push(observation);
    }
    partitions
}
