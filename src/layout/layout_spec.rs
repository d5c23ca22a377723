use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::error::{ReportError, Result};
use crate::models::{Color, MetricId};
use crate::utils::constants::{DEFAULT_LIMIT, DEFAULT_ROW_HEIGHT};

/// Placement of one leaderboard on the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MetricSlot {
    pub metric: MetricId,

    pub start_y: i32,

    #[serde(default = "default_row_height")]
    #[validate(range(min = 1))]
    pub row_height: i32,

    pub station_column_x: i32,

    pub value_column_x: i32,

    #[serde(default)]
    pub unit_column_x: Option<i32>,

    // One color per rank, best first
    #[validate(length(min = 1))]
    pub color_palette: Vec<Color>,
}

fn default_row_height() -> i32 {
    DEFAULT_ROW_HEIGHT
}

impl MetricSlot {
    pub fn row_y(&self, rank_position: usize) -> i32 {
        self.start_y + rank_position as i32 * self.row_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_color")]
    pub color: Color,
}

fn default_color() -> Color {
    Color::BLACK
}

impl Anchor {
    pub const fn new(x: i32, y: i32, color: Color) -> Self {
        Self { x, y, color }
    }
}

/// Fixed positions of the thermal amplitude panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeSlot {
    pub station: Anchor,
    pub max: Anchor,
    pub min: Anchor,
    pub amplitude: Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub metrics: Vec<MetricSlot>,
    #[serde(default)]
    pub amplitude: Option<AmplitudeSlot>,
}

impl Default for LayoutSpec {
    /// Geometry shared by the three territory templates
    fn default() -> Self {
        let palette = vec![Color::BLACK; DEFAULT_LIMIT];
        let slot = |metric, start_y, station_column_x, value_column_x| MetricSlot {
            metric,
            start_y,
            row_height: DEFAULT_ROW_HEIGHT,
            station_column_x,
            value_column_x,
            unit_column_x: None,
            color_palette: palette.clone(),
        };

        Self {
            metrics: vec![
                slot(MetricId::TempMax, 300, 40, 450),
                slot(MetricId::TempMin, 560, 40, 450),
                slot(MetricId::WindGustMax, 560, 600, 950),
                slot(MetricId::RainAccum, 300, 600, 950),
            ],
            amplitude: Some(AmplitudeSlot {
                station: Anchor::new(40, 820, Color::BLACK),
                max: Anchor::new(600, 820, Color::BLACK),
                min: Anchor::new(750, 820, Color::BLACK),
                amplitude: Anchor::new(950, 820, Color::BLACK),
            }),
        }
    }
}

impl LayoutSpec {
    pub fn slot(&self, metric: MetricId) -> Option<&MetricSlot> {
        self.metrics.iter().find(|s| s.metric == metric)
    }

    /// Field-level validation of every slot plus duplicate detection
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for slot in &self.metrics {
            slot.validate()?;
            if !seen.insert(slot.metric) {
                return Err(ReportError::config(format!(
                    "Layout defines metric '{}' more than once",
                    slot.metric
                )));
            }
        }
        Ok(())
    }
}
