use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{MetricId, Territory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Max, // Highest value ranks first
    Min, // Lowest value ranks first
}

impl Direction {
    /// Ordering of two metric values under this direction (best first).
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        match self {
            Direction::Max => b.total_cmp(&a),
            Direction::Min => a.total_cmp(&b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank_position: usize,
    pub station_id: String,
    pub metric_value: f64,
    pub station_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub metric: MetricId,
    pub direction: Direction,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The station with the widest valid max/min temperature spread in a territory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplitudeRecord {
    pub station_id: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub amplitude: f64,
}

impl AmplitudeRecord {
    /// Amplitude as reported: rounded to two decimal places.
    pub fn rounded_amplitude(&self) -> f64 {
        (self.amplitude * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplitudePanel {
    pub record: AmplitudeRecord,
    pub station_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoryReport {
    pub territory: Territory,
    pub date: NaiveDate,
    pub leaderboards: Vec<Leaderboard>,
    pub amplitude: Option<AmplitudePanel>,
}

impl TerritoryReport {
    pub fn leaderboard(&self, metric: MetricId) -> Option<&Leaderboard> {
        self.leaderboards.iter().find(|b| b.metric == metric)
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} ({}) - {}\n",
            self.territory.display_name(),
            self.territory,
            self.date
        );

        for board in &self.leaderboards {
            out.push_str(&format!(
                "\n{} [{:?}]\n",
                board.metric.display_name(),
                board.direction
            ));
            if board.is_empty() {
                out.push_str("  (no valid readings)\n");
            }
            for entry in &board.entries {
                out.push_str(&format!(
                    "  {}. {} ({}): {:.1} {}\n",
                    entry.rank_position + 1,
                    entry.station_display_name,
                    entry.station_id,
                    entry.metric_value,
                    board.metric.units()
                ));
            }
        }

        match &self.amplitude {
            Some(panel) => out.push_str(&format!(
                "\nThermal amplitude: {} ({}): {:.1} - {:.1} = {:.2} °C\n",
                panel.station_display_name,
                panel.record.station_id,
                panel.record.temp_max,
                panel.record.temp_min,
                panel.record.rounded_amplitude()
            )),
            None => out.push_str("\nThermal amplitude: no valid readings\n"),
        }

        out
    }
}
