use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Territory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationInfo {
    #[validate(length(min = 1))]
    pub station_id: String,

    #[validate(custom(function = "validate_display_name"))]
    pub display_name: String,

    pub territory_label: Option<String>,
}

fn validate_display_name(name: &str) -> std::result::Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("blank_display_name"));
    }
    Ok(())
}

impl StationInfo {
    pub fn new(
        station_id: impl Into<String>,
        display_name: impl Into<String>,
        territory_label: Option<String>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            display_name: display_name.into(),
            territory_label,
        }
    }

    pub fn territory(&self) -> Option<Territory> {
        self.territory_label
            .as_deref()
            .and_then(Territory::from_label)
    }
}

/// Per-territory display-name cleanup: strips administrative tokens the
/// directory appends or prepends to station names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameCleanup {
    tokens: Vec<String>,
}

impl NameCleanup {
    pub fn new(tokens: Vec<String>) -> Self {
        let tokens = tokens
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn clean(&self, name: &str) -> String {
        let original = name.trim();
        let mut cleaned = original;

        for token in &self.tokens {
            if let Some(rest) = cleaned.strip_prefix(token.as_str()) {
                cleaned = rest.trim();
            }
            if let Some(rest) = cleaned.strip_suffix(token.as_str()) {
                cleaned = rest.trim();
            }
        }

        if cleaned.is_empty() {
            original.to_string()
        } else {
            cleaned.to_string()
        }
    }
}
