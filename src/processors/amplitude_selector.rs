use crate::models::{AmplitudeRecord, MetricId, Observation};
use crate::processors::TieBreak;

/// Station with the widest max-min temperature spread, using snapshot order for ties.
pub fn select_amplitude(partition: &[Observation]) -> Option<AmplitudeRecord> {
    select_amplitude_with(partition, TieBreak::SnapshotOrder)
}

/// Rows missing either temperature are ignored. Comparison uses full precision;
/// rounding happens only when the amplitude is displayed.
pub fn select_amplitude_with(
    partition: &[Observation],
    tie_break: TieBreak,
) -> Option<AmplitudeRecord> {
    let mut spreads: Vec<(&Observation, f64)> = partition
        .iter()
        .filter_map(|o| o.temperature_spread().map(|spread| (o, spread)))
        .collect();

    spreads.sort_by(|(a, spread_a), (b, spread_b)| {
        spread_b
            .total_cmp(spread_a)
            .then_with(|| tie_break.compare(a, b))
    });

    spreads
        .into_iter()
        .next()
        .map(|(observation, amplitude)| AmplitudeRecord {
            station_id: observation.station_id.clone(),
            temp_max: observation.value(MetricId::TempMax),
            temp_min: observation.value(MetricId::TempMin),
            amplitude,
        })
}
