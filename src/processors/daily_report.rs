use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{NameCleanup, Territory, TerritoryReport};
use crate::processors::{LeaderboardBuilder, ReportBuilder, SnapshotSummary};
use crate::readers::{
    assign_territories, filter_by_date, partition_by_territory, ObservationSource,
    StationDirectory,
};

/// Every territory report for one day, plus the snapshot coverage they were built from
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub summary: SnapshotSummary,
    pub reports: Vec<TerritoryReport>,
}

impl DailyReport {
    pub fn report(&self, territory: Territory) -> Option<&TerritoryReport> {
        self.reports.iter().find(|r| r.territory == territory)
    }
}

/// Fetch, filter and partition the snapshot, then build one report per
/// requested territory (in territory order). A territory with no rows still
/// gets a report with empty leaderboards.
pub async fn build_daily_report(
    source: &dyn ObservationSource,
    directory: &dyn StationDirectory,
    config: &AppConfig,
    date: NaiveDate,
    territories: &[Territory],
) -> Result<DailyReport> {
    let rows = source.fetch_snapshot().await?;
    let total = rows.len();
    let rows = filter_by_date(rows, date);
    info!(%date, total, active = rows.len(), "filtered snapshot by date");

    let observations = assign_territories(rows, directory).await?;
    let summary = SnapshotSummary::from_observations(date, &observations);
    let partitions = partition_by_territory(observations);

    let mut territories = territories.to_vec();
    territories.sort();
    territories.dedup();

    let mut reports = Vec::with_capacity(territories.len());
    for territory in territories {
        let partition = partitions
            .get(&territory)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if partition.is_empty() {
            warn!(%territory, %date, "no observations for territory");
        }

        let cleanup = config
            .territory(territory)
            .map(|t| t.name_cleanup())
            .unwrap_or_else(NameCleanup::default);

        let leaderboards =
            LeaderboardBuilder::new(directory).with_tie_break(config.ranking.tie_break);
        let report = ReportBuilder::new(&config.plan, leaderboards)
            .build(territory, date, partition, &cleanup)
            .await?;
        reports.push(report);
    }

    Ok(DailyReport {
        date,
        summary,
        reports,
    })
}
