use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::models::{MetricId, Observation, Territory};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerritoryStatistics {
    pub stations: usize,
    pub sentinel_readings: HashMap<MetricId, usize>,
}

impl TerritoryStatistics {
    pub fn sentinel_count(&self, metric: MetricId) -> usize {
        self.sentinel_readings.get(&metric).copied().unwrap_or(0)
    }

    pub fn valid_count(&self, metric: MetricId) -> usize {
        self.stations - self.sentinel_count(metric)
    }
}

/// Per-territory station counts and sentinel coverage for one day's snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub date: NaiveDate,
    pub total_rows: usize,
    pub territories: BTreeMap<Territory, TerritoryStatistics>,
}

impl SnapshotSummary {
    pub fn from_observations(date: NaiveDate, observations: &[Observation]) -> Self {
        let mut territories: BTreeMap<Territory, TerritoryStatistics> = BTreeMap::new();

        for observation in observations {
            let stats = territories.entry(observation.territory).or_default();
            stats.stations += 1;

            for metric in MetricId::ALL {
                if !observation.readings.is_valid(metric) {
                    *stats.sentinel_readings.entry(metric).or_insert(0) += 1;
                }
            }
        }

        Self {
            date,
            total_rows: observations.len(),
            territories,
        }
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== Snapshot {} ===\n", self.date));
        summary.push_str(&format!("Stations: {}\n", self.total_rows));

        for (territory, stats) in &self.territories {
            summary.push_str(&format!(
                "\n{}: {} stations\n",
                territory.display_name(),
                stats.stations
            ));
            for metric in MetricId::ALL {
                let missing = stats.sentinel_count(metric);
                summary.push_str(&format!(
                    "  {:<14} {:>4} valid, {:>4} missing ({:.1}%)\n",
                    metric.key(),
                    stats.valid_count(metric),
                    missing,
                    100.0 * missing as f64 / stats.stations.max(1) as f64
                ));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Readings;

    #[test]
    fn test_counts_sentinels_per_territory() {
        let date = NaiveDate::from_ymd_opt(2022, 3, 9).unwrap();
        let observations = vec![
            Observation::new(
                "1",
                date,
                Territory::Mainland,
                Readings::missing().with(MetricId::TempMax, 20.0),
            ),
            Observation::new(
                "2",
                date,
                Territory::Mainland,
                Readings::missing()
                    .with(MetricId::TempMax, 21.0)
                    .with(MetricId::RainAccum, 1.0),
            ),
            Observation::new("3", date, Territory::Azores, Readings::missing()),
        ];

        let summary = SnapshotSummary::from_observations(date, &observations);

        assert_eq!(summary.total_rows, 3);
        let mainland = &summary.territories[&Territory::Mainland];
        assert_eq!(mainland.stations, 2);
        assert_eq!(mainland.valid_count(MetricId::TempMax), 2);
        assert_eq!(mainland.sentinel_count(MetricId::RainAccum), 1);
        assert_eq!(mainland.sentinel_count(MetricId::HumidityMin), 2);
        assert!(!summary.territories.contains_key(&Territory::Madeira));

        let text = summary.summary();
        assert!(text.contains("=== Snapshot 2022-03-09 ==="));
        assert!(text.contains("Açores: 1 stations"));
    }
}
