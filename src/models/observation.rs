use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReportError, Result};
use crate::utils::constants::SENTINEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Territory {
    Mainland,
    Madeira,
    Azores,
}

impl Territory {
    pub const ALL: [Territory; 3] = [Territory::Mainland, Territory::Madeira, Territory::Azores];

    /// Parse a free-form territory label as published by the upstream services.
    pub fn from_label(label: &str) -> Option<Self> {
        let folded = fold_label(label);

        match folded.as_str() {
            "mainland" | "continente" | "portugal continental" => Some(Territory::Mainland),
            _ if folded.contains("madeira") => Some(Territory::Madeira),
            _ if folded.contains("acores") || folded.contains("azores") => {
                Some(Territory::Azores)
            }
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Territory::Mainland => "mainland",
            Territory::Madeira => "madeira",
            Territory::Azores => "azores",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Territory::Mainland => "Continente",
            Territory::Madeira => "Madeira",
            Territory::Azores => "Açores",
        }
    }
}

impl fmt::Display for Territory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Territory {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Territory::from_label(s)
            .ok_or_else(|| ReportError::config(format!("Unknown territory: '{}'", s)))
    }
}

/// Lowercase and strip the Portuguese diacritics that appear in territory labels.
fn fold_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ç' => 'c',
            'á' | 'à' | 'ã' | 'â' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'õ' | 'ô' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    TempMax,
    TempMin,
    WindGustMax,
    RainAccum,
    HumidityMin,
    HumidityMax,
}

impl MetricId {
    pub const ALL: [MetricId; 6] = [
        MetricId::TempMax,
        MetricId::TempMin,
        MetricId::WindGustMax,
        MetricId::RainAccum,
        MetricId::HumidityMin,
        MetricId::HumidityMax,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricId::TempMax => "temp_max",
            MetricId::TempMin => "temp_min",
            MetricId::WindGustMax => "wind_gust_max",
            MetricId::RainAccum => "rain_accum",
            MetricId::HumidityMin => "humidity_min",
            MetricId::HumidityMax => "humidity_max",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MetricId::TempMax => "Temperature (Max)",
            MetricId::TempMin => "Temperature (Min)",
            MetricId::WindGustMax => "Wind Gust (Max)",
            MetricId::RainAccum => "Accumulated Rainfall",
            MetricId::HumidityMin => "Humidity (Min)",
            MetricId::HumidityMax => "Humidity (Max)",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            MetricId::TempMax | MetricId::TempMin => "°C",
            MetricId::WindGustMax => "km/h",
            MetricId::RainAccum => "mm",
            MetricId::HumidityMin | MetricId::HumidityMax => "%",
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Daily readings for one station. Absent or `null` fields read as the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    #[serde(default = "sentinel", deserialize_with = "reading")]
    pub temp_max: f64,

    #[serde(default = "sentinel", deserialize_with = "reading")]
    pub temp_min: f64,

    #[serde(
        rename = "vento_int_max_inst",
        alias = "wind_gust_max",
        default = "sentinel",
        deserialize_with = "reading"
    )]
    pub wind_gust_max: f64,

    #[serde(
        rename = "prec_quant",
        alias = "rain_accum",
        default = "sentinel",
        deserialize_with = "reading"
    )]
    pub rain_accum: f64,

    #[serde(
        rename = "hum_min",
        alias = "humidity_min",
        default = "sentinel",
        deserialize_with = "reading"
    )]
    pub humidity_min: f64,

    #[serde(
        rename = "hum_max",
        alias = "humidity_max",
        default = "sentinel",
        deserialize_with = "reading"
    )]
    pub humidity_max: f64,
}

fn sentinel() -> f64 {
    SENTINEL
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Text(String),
}

fn reading<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawReading>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawReading::Number(value)) => value,
        Some(RawReading::Text(text)) => text.trim().parse().unwrap_or(SENTINEL),
        None => SENTINEL,
    })
}

impl Readings {
    /// All metrics set to the sentinel.
    pub fn missing() -> Self {
        Self {
            temp_max: SENTINEL,
            temp_min: SENTINEL,
            wind_gust_max: SENTINEL,
            rain_accum: SENTINEL,
            humidity_min: SENTINEL,
            humidity_max: SENTINEL,
        }
    }

    pub fn with(mut self, metric: MetricId, value: f64) -> Self {
        *self.slot_mut(metric) = value;
        self
    }

    pub fn get(&self, metric: MetricId) -> f64 {
        match metric {
            MetricId::TempMax => self.temp_max,
            MetricId::TempMin => self.temp_min,
            MetricId::WindGustMax => self.wind_gust_max,
            MetricId::RainAccum => self.rain_accum,
            MetricId::HumidityMin => self.humidity_min,
            MetricId::HumidityMax => self.humidity_max,
        }
    }

    /// A reading is usable unless it is the sentinel (or not a finite number).
    pub fn is_valid(&self, metric: MetricId) -> bool {
        is_valid_reading(self.get(metric))
    }

    pub fn valid(&self, metric: MetricId) -> Option<f64> {
        let value = self.get(metric);
        is_valid_reading(value).then_some(value)
    }

    fn slot_mut(&mut self, metric: MetricId) -> &mut f64 {
        match metric {
            MetricId::TempMax => &mut self.temp_max,
            MetricId::TempMin => &mut self.temp_min,
            MetricId::WindGustMax => &mut self.wind_gust_max,
            MetricId::RainAccum => &mut self.rain_accum,
            MetricId::HumidityMin => &mut self.humidity_min,
            MetricId::HumidityMax => &mut self.humidity_max,
        }
    }
}

impl Default for Readings {
    fn default() -> Self {
        Self::missing()
    }
}

pub fn is_valid_reading(value: f64) -> bool {
    value != SENTINEL && value.is_finite()
}

/// One station row exactly as the snapshot publishes it, before territory labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub station_id: String,
    pub date: NaiveDate,
    pub territory_label: Option<String>,
    pub readings: Readings,
}

/// One station's observations for one day, scoped to a known territory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub station_id: String,
    pub date: NaiveDate,
    pub territory: Territory,
    pub readings: Readings,
}

impl Observation {
    pub fn new(
        station_id: impl Into<String>,
        date: NaiveDate,
        territory: Territory,
        readings: Readings,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            territory,
            readings,
        }
    }

    pub fn value(&self, metric: MetricId) -> f64 {
        self.readings.get(metric)
    }

    pub fn temperature_spread(&self) -> Option<f64> {
        match (
            self.readings.valid(MetricId::TempMax),
            self.readings.valid(MetricId::TempMin),
        ) {
            (Some(max), Some(min)) => Some(max - min),
            _ => None,
        }
    }
}
