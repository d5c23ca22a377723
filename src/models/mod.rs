pub mod draw;
pub mod leaderboard;
pub mod observation;
pub mod station;

pub use draw::{Color, DrawInstruction};
pub use leaderboard::{
    AmplitudePanel, AmplitudeRecord, Direction, Leaderboard, LeaderboardEntry, TerritoryReport,
};
pub use observation::{is_valid_reading, MetricId, Observation, Readings, SnapshotRow, Territory};
pub use station::{NameCleanup, StationInfo};
