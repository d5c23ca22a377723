use tracing::debug;

use crate::error::{ReportError, Result};
use crate::layout::{AmplitudeSlot, LayoutSpec, MetricSlot};
use crate::models::{AmplitudePanel, DrawInstruction, Leaderboard, Territory, TerritoryReport};
use crate::processors::ReportPlan;
use crate::utils::format_value;

/// Maps ranked entries onto template coordinates and colors. All configuration
/// checks happen in [`RenderBinder::new`]; binding is a pure transform.
#[derive(Debug, Clone)]
pub struct RenderBinder {
    slots: Vec<MetricSlot>,
    amplitude: Option<AmplitudeSlot>,
}

impl RenderBinder {
    pub fn new(layout: &LayoutSpec, plan: &ReportPlan) -> Result<Self> {
        layout.check()?;
        plan.validate()?;

        for board in &plan.boards {
            let slot = layout.slot(board.metric).ok_or_else(|| {
                ReportError::config(format!("No layout slot for board '{}'", board.metric))
            })?;

            if slot.color_palette.len() < board.limit {
                return Err(ReportError::config(format!(
                    "Palette for '{}' has {} colors but the board ranks {}",
                    board.metric,
                    slot.color_palette.len(),
                    board.limit
                )));
            }
        }

        if plan.amplitude && layout.amplitude.is_none() {
            return Err(ReportError::config(
                "Amplitude panel is enabled but the layout has no amplitude slot",
            ));
        }

        Ok(Self {
            slots: layout.metrics.clone(),
            amplitude: layout.amplitude,
        })
    }

    pub fn bind_report(&self, report: &TerritoryReport) -> Result<Vec<DrawInstruction>> {
        self.bind(
            report.territory,
            &report.leaderboards,
            report.amplitude.as_ref(),
        )
    }

    /// Emit draw instructions: per leaderboard, name/value/unit for each rank,
    /// then the amplitude panel. Inputs are checked before anything is emitted.
    pub fn bind(
        &self,
        territory: Territory,
        leaderboards: &[Leaderboard],
        amplitude: Option<&AmplitudePanel>,
    ) -> Result<Vec<DrawInstruction>> {
        let mut bound = Vec::with_capacity(leaderboards.len());
        for board in leaderboards {
            let slot = self.slot_for(board)?;
            bound.push((board, slot));
        }

        let amplitude = match amplitude {
            Some(panel) => {
                let slot = self.amplitude.as_ref().ok_or_else(|| {
                    ReportError::config("Layout has no amplitude slot for the amplitude panel")
                })?;
                Some((panel, slot))
            }
            None => None,
        };

        let mut instructions = Vec::new();

        for (board, slot) in bound {
            let unit = board.metric.units();
            for entry in &board.entries {
                let y = slot.row_y(entry.rank_position);
                let color = slot.color_palette[entry.rank_position];

                instructions.push(DrawInstruction::new(
                    slot.station_column_x,
                    y,
                    entry.station_display_name.as_str(),
                    color,
                ));
                instructions.push(DrawInstruction::new(
                    slot.value_column_x,
                    y,
                    format_value(entry.metric_value),
                    color,
                ));
                if let Some(unit_x) = slot.unit_column_x {
                    instructions.push(DrawInstruction::new(unit_x, y, unit, color));
                }
            }
        }

        if let Some((panel, slot)) = amplitude {
            let record = &panel.record;
            let fields = [
                (&slot.station, panel.station_display_name.clone()),
                (&slot.max, format_value(record.temp_max)),
                (&slot.min, format_value(record.temp_min)),
                (&slot.amplitude, format_value(record.rounded_amplitude())),
            ];
            for (anchor, text) in fields {
                instructions.push(DrawInstruction::new(anchor.x, anchor.y, text, anchor.color));
            }
        }

        debug!(%territory, count = instructions.len(), "bound draw instructions");
        Ok(instructions)
    }

    fn slot_for(&self, board: &Leaderboard) -> Result<&MetricSlot> {
        let slot = self
            .slots
            .iter()
            .find(|s| s.metric == board.metric)
            .ok_or_else(|| {
                ReportError::config(format!("No layout slot for board '{}'", board.metric))
            })?;

        if let Some(entry) = board
            .entries
            .iter()
            .find(|e| e.rank_position >= slot.color_palette.len())
        {
            return Err(ReportError::config(format!(
                "Rank {} of '{}' has no palette color ({} configured)",
                entry.rank_position,
                board.metric,
                slot.color_palette.len()
            )));
        }

        Ok(slot)
    }
}
