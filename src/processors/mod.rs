pub mod amplitude_selector;
pub mod daily_report;
pub mod leaderboard_builder;
pub mod report_builder;
pub mod snapshot_summary;

pub use amplitude_selector::{select_amplitude, select_amplitude_with};
pub use daily_report::{build_daily_report, DailyReport};
pub use leaderboard_builder::{compare_station_ids, rank_observations, LeaderboardBuilder, TieBreak};
pub use report_builder::{BoardSpec, ReportBuilder, ReportPlan};
pub use snapshot_summary::{SnapshotSummary, TerritoryStatistics};
