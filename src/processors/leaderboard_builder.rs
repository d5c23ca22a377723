use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{
    Direction, Leaderboard, LeaderboardEntry, MetricId, NameCleanup, Observation,
};
use crate::readers::StationDirectory;

/// How equal metric values are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Station id ascending (numeric when both ids are numeric)
    #[default]
    StationId,
    /// Keep snapshot order
    SnapshotOrder,
}

impl TieBreak {
    pub fn compare(&self, a: &Observation, b: &Observation) -> Ordering {
        match self {
            TieBreak::StationId => compare_station_ids(&a.station_id, &b.station_id),
            TieBreak::SnapshotOrder => Ordering::Equal,
        }
    }
}

pub fn compare_station_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Rank a single-territory partition for one metric: drop sentinel readings,
/// stable-sort by value in `direction`, keep the first `limit`.
pub fn rank_observations(
    partition: &[Observation],
    metric: MetricId,
    direction: Direction,
    limit: usize,
    tie_break: TieBreak,
) -> Vec<&Observation> {
    let mut valid: Vec<&Observation> = partition
        .iter()
        .filter(|o| o.readings.is_valid(metric))
        .collect();

    let excluded = partition.len() - valid.len();
    if excluded > 0 {
        debug!(%metric, excluded, "excluded sentinel readings");
    }

    valid.sort_by(|a, b| {
        direction
            .compare(a.value(metric), b.value(metric))
            .then_with(|| tie_break.compare(a, b))
    });
    valid.truncate(limit);
    valid
}

pub struct LeaderboardBuilder<'a> {
    directory: &'a dyn StationDirectory,
    tie_break: TieBreak,
}

impl<'a> LeaderboardBuilder<'a> {
    pub fn new(directory: &'a dyn StationDirectory) -> Self {
        Self {
            directory,
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Build the top-`limit` leaderboard for `metric`. Any failed name lookup aborts.
    pub async fn build_leaderboard(
        &self,
        partition: &[Observation],
        metric: MetricId,
        direction: Direction,
        limit: usize,
        cleanup: &NameCleanup,
    ) -> Result<Leaderboard> {
        let ranked = rank_observations(partition, metric, direction, limit, self.tie_break);

        let mut entries = Vec::with_capacity(ranked.len());
        for (rank_position, observation) in ranked.into_iter().enumerate() {
            let station_display_name = self
                .resolve_name(&observation.station_id, cleanup)
                .await?;

            entries.push(LeaderboardEntry {
                rank_position,
                station_id: observation.station_id.clone(),
                metric_value: observation.value(metric),
                station_display_name,
            });
        }

        if entries.is_empty() {
            warn!(%metric, "no valid readings for leaderboard");
        }

        Ok(Leaderboard {
            metric,
            direction,
            entries,
        })
    }

    pub async fn resolve_name(&self, station_id: &str, cleanup: &NameCleanup) -> Result<String> {
        let info = self.directory.lookup(station_id).await?;
        Ok(cleanup.clean(&info.display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::models::{Readings, StationInfo, Territory};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct NamedDirectory;

    #[async_trait]
    impl StationDirectory for NamedDirectory {
        async fn lookup(&self, station_id: &str) -> Result<StationInfo> {
            if station_id == "404" {
                return Err(ReportError::lookup(station_id, "unknown station"));
            }
            Ok(StationInfo::new(
                station_id,
                format!("Station {} (Madeira)", station_id),
                None,
            ))
        }
    }

    fn observation(id: &str, metric: MetricId, value: f64) -> Observation {
        Observation::new(
            id,
            NaiveDate::from_ymd_opt(2022, 3, 9).unwrap(),
            Territory::Madeira,
            Readings::missing().with(metric, value),
        )
    }

    fn ids(ranked: &[&Observation]) -> Vec<String> {
        ranked.iter().map(|o| o.station_id.clone()).collect()
    }

    #[test]
    fn test_rank_max_excludes_sentinel() {
        let partition = vec![
            observation("1", MetricId::TempMax, 30.0),
            observation("2", MetricId::TempMax, -99.0),
            observation("3", MetricId::TempMax, 35.0),
            observation("4", MetricId::TempMax, 28.0),
            observation("5", MetricId::TempMax, 33.0),
        ];

        let ranked = rank_observations(
            &partition,
            MetricId::TempMax,
            Direction::Max,
            4,
            TieBreak::StationId,
        );

        assert_eq!(ids(&ranked), vec!["3", "5", "1", "4"]);
    }

    #[test]
    fn test_rank_min_ascending() {
        let partition = vec![
            observation("1", MetricId::TempMin, 4.0),
            observation("2", MetricId::TempMin, -99.0),
            observation("3", MetricId::TempMin, -2.5),
            observation("4", MetricId::TempMin, 1.0),
        ];

        let ranked = rank_observations(
            &partition,
            MetricId::TempMin,
            Direction::Min,
            4,
            TieBreak::StationId,
        );

        assert_eq!(ids(&ranked), vec!["3", "4", "1"]);
    }

    #[test]
    fn test_rank_fewer_valid_than_limit() {
        let partition = vec![
            observation("1", MetricId::RainAccum, -99.0),
            observation("2", MetricId::RainAccum, 0.4),
        ];

        let ranked = rank_observations(
            &partition,
            MetricId::RainAccum,
            Direction::Max,
            4,
            TieBreak::StationId,
        );
        assert_eq!(ranked.len(), 1);

        let empty = rank_observations(
            &[],
            MetricId::RainAccum,
            Direction::Max,
            4,
            TieBreak::StationId,
        );
        assert!(empty.is_empty());
    }

    #[test]
    fn test_tie_break_policies() {
        let partition = vec![
            observation("1210702", MetricId::WindGustMax, 50.0),
            observation("99", MetricId::WindGustMax, 50.0),
            observation("1200548", MetricId::WindGustMax, 60.0),
        ];

        let by_id = rank_observations(
            &partition,
            MetricId::WindGustMax,
            Direction::Max,
            4,
            TieBreak::StationId,
        );
        assert_eq!(ids(&by_id), vec!["1200548", "99", "1210702"]);

        let stable = rank_observations(
            &partition,
            MetricId::WindGustMax,
            Direction::Max,
            4,
            TieBreak::SnapshotOrder,
        );
        assert_eq!(ids(&stable), vec!["1200548", "1210702", "99"]);
    }

    #[test]
    fn test_compare_station_ids() {
        assert_eq!(compare_station_ids("99", "100"), Ordering::Less);
        assert_eq!(compare_station_ids("b", "a"), Ordering::Greater);
        assert_eq!(compare_station_ids("10", "a"), Ordering::Less);
    }

    #[tokio::test]
    async fn test_build_leaderboard_resolves_clean_names() {
        let partition = vec![
            observation("1", MetricId::TempMax, 20.0),
            observation("2", MetricId::TempMax, 22.5),
        ];
        let cleanup = NameCleanup::new(vec!["(Madeira)".to_string()]);
        let directory = NamedDirectory;
        let builder = LeaderboardBuilder::new(&directory);

        let board = builder
            .build_leaderboard(&partition, MetricId::TempMax, Direction::Max, 4, &cleanup)
            .await
            .unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!(board.entries[0].rank_position, 0);
        assert_eq!(board.entries[0].station_id, "2");
        assert_eq!(board.entries[0].metric_value, 22.5);
        assert_eq!(board.entries[0].station_display_name, "Station 2");
        assert_eq!(board.entries[1].rank_position, 1);
    }

    #[tokio::test]
    async fn test_build_leaderboard_aborts_on_lookup_failure() {
        let partition = vec![
            observation("1", MetricId::TempMax, 20.0),
            observation("404", MetricId::TempMax, 25.0),
        ];
        let directory = NamedDirectory;
        let builder = LeaderboardBuilder::new(&directory);

        let result = builder
            .build_leaderboard(
                &partition,
                MetricId::TempMax,
                Direction::Max,
                4,
                &NameCleanup::default(),
            )
            .await;

        assert!(matches!(result, Err(ReportError::LookupFailure { .. })));
    }
}
