use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::models::{
    AmplitudePanel, Direction, MetricId, NameCleanup, Observation, Territory, TerritoryReport,
};
use crate::processors::amplitude_selector::select_amplitude_with;
use crate::processors::LeaderboardBuilder;
use crate::utils::constants::DEFAULT_LIMIT;

/// One row of the declarative board table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub metric: MetricId,
    pub direction: Direction,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl BoardSpec {
    pub fn new(metric: MetricId, direction: Direction, limit: usize) -> Self {
        Self {
            metric,
            direction,
            limit,
        }
    }
}

/// Which leaderboards each territory gets, and whether it has an amplitude panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPlan {
    pub boards: Vec<BoardSpec>,
    #[serde(default = "default_amplitude")]
    pub amplitude: bool,
}

fn default_amplitude() -> bool {
    true
}

impl Default for ReportPlan {
    fn default() -> Self {
        Self {
            boards: vec![
                BoardSpec::new(MetricId::TempMax, Direction::Max, DEFAULT_LIMIT),
                BoardSpec::new(MetricId::TempMin, Direction::Min, DEFAULT_LIMIT),
                BoardSpec::new(MetricId::WindGustMax, Direction::Max, DEFAULT_LIMIT),
                BoardSpec::new(MetricId::RainAccum, Direction::Max, DEFAULT_LIMIT),
            ],
            amplitude: true,
        }
    }
}

impl ReportPlan {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for board in &self.boards {
            if board.limit == 0 {
                return Err(ReportError::config(format!(
                    "Board '{}' has a limit of 0",
                    board.metric
                )));
            }
            if !seen.insert(board.metric) {
                return Err(ReportError::config(format!(
                    "Board '{}' is listed more than once",
                    board.metric
                )));
            }
        }
        Ok(())
    }

    pub fn board(&self, metric: MetricId) -> Option<&BoardSpec> {
        self.boards.iter().find(|b| b.metric == metric)
    }
}

/// Runs the board table over one territory partition
pub struct ReportBuilder<'a> {
    plan: &'a ReportPlan,
    leaderboards: LeaderboardBuilder<'a>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(plan: &'a ReportPlan, leaderboards: LeaderboardBuilder<'a>) -> Self {
        Self { plan, leaderboards }
    }

    pub async fn build(
        &self,
        territory: Territory,
        date: NaiveDate,
        partition: &[Observation],
        cleanup: &NameCleanup,
    ) -> Result<TerritoryReport> {
        let scoped: Vec<Observation> = partition
            .iter()
            .filter(|o| o.territory == territory && o.date == date)
            .cloned()
            .collect();
        if scoped.len() != partition.len() {
            warn!(
                %territory,
                dropped = partition.len() - scoped.len(),
                "partition contained rows from another territory or date"
            );
        }

        let mut leaderboards = Vec::with_capacity(self.plan.boards.len());
        for board in &self.plan.boards {
            let leaderboard = self
                .leaderboards
                .build_leaderboard(&scoped, board.metric, board.direction, board.limit, cleanup)
                .await?;
            leaderboards.push(leaderboard);
        }

        let amplitude = if self.plan.amplitude {
            match select_amplitude_with(&scoped, self.leaderboards.tie_break()) {
                Some(record) => {
                    let station_display_name = self
                        .leaderboards
                        .resolve_name(&record.station_id, cleanup)
                        .await?;
                    Some(AmplitudePanel {
                        record,
                        station_display_name,
                    })
                }
                None => {
                    warn!(%territory, "no station with both temperatures valid");
                    None
                }
            }
        } else {
            None
        };

        info!(
            %territory,
            stations = scoped.len(),
            boards = leaderboards.len(),
            amplitude = amplitude.is_some(),
            "built territory report"
        );

        Ok(TerritoryReport {
            territory,
            date,
            leaderboards,
            amplitude,
        })
    }
}
