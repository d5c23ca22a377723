use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::models::TerritoryReport;

#[derive(Debug, Serialize)]
struct LeaderboardRow<'a> {
    date: NaiveDate,
    territory: &'a str,
    board: &'a str,
    rank: usize,
    station_id: &'a str,
    station_name: &'a str,
    value: f64,
}

/// Flat export of every ranked row and amplitude panel, one line per station
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_reports<W: Write>(&self, writer: W, reports: &[TerritoryReport]) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);

        for report in reports {
            let territory = report.territory.slug();

            for board in &report.leaderboards {
                for entry in &board.entries {
                    out.serialize(LeaderboardRow {
                        date: report.date,
                        territory,
                        board: board.metric.key(),
                        rank: entry.rank_position + 1,
                        station_id: &entry.station_id,
                        station_name: &entry.station_display_name,
                        value: entry.metric_value,
                    })?;
                }
            }

            if let Some(panel) = &report.amplitude {
                out.serialize(LeaderboardRow {
                    date: report.date,
                    territory,
                    board: "amplitude",
                    rank: 1,
                    station_id: &panel.record.station_id,
                    station_name: &panel.station_display_name,
                    value: panel.record.rounded_amplitude(),
                })?;
            }
        }

        out.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self, reports: &[TerritoryReport]) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_reports(&mut buffer, reports)?;
        Ok(buffer)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AmplitudePanel, AmplitudeRecord, Direction, Leaderboard, LeaderboardEntry, MetricId,
        Territory,
    };

    fn report() -> TerritoryReport {
        TerritoryReport {
            territory: Territory::Madeira,
            date: NaiveDate::from_ymd_opt(2022, 3, 9).unwrap(),
            leaderboards: vec![
                Leaderboard {
                    metric: MetricId::RainAccum,
                    direction: Direction::Max,
                    entries: vec![LeaderboardEntry {
                        rank_position: 0,
                        station_id: "1200548".to_string(),
                        metric_value: 12.4,
                        station_display_name: "Funchal, Observatório".to_string(),
                    }],
                },
                Leaderboard {
                    metric: MetricId::WindGustMax,
                    direction: Direction::Max,
                    entries: vec![],
                },
            ],
            amplitude: Some(AmplitudePanel {
                record: AmplitudeRecord {
                    station_id: "1200548".to_string(),
                    temp_max: 21.0,
                    temp_min: 12.333,
                    amplitude: 8.667,
                },
                station_display_name: "Funchal, Observatório".to_string(),
            }),
        }
    }

    #[test]
    fn test_write_reports_csv() {
        let bytes = CsvWriter::new().to_bytes(&[report()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "date,territory,board,rank,station_id,station_name,value"
        );
        assert_eq!(
            lines[1],
            "2022-03-09,madeira,rain_accum,1,1200548,\"Funchal, Observatório\",12.4"
        );
        assert_eq!(
            lines[2],
            "2022-03-09,madeira,amplitude,1,1200548,\"Funchal, Observatório\",8.67"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_no_reports() {
        let bytes = CsvWriter::new().to_bytes(&[]).unwrap();
        assert!(bytes.is_empty());
    }
}
