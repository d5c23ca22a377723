use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::error::{ReportError, Result};
use crate::layout::{LayoutSpec, RenderBinder};
use crate::models::{NameCleanup, Territory};
use crate::processors::{ReportPlan, TieBreak};
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_DIRECTORY_URL, DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE,
    DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, ENV_PREFIX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SourceConfig {
    #[validate(url)]
    pub url: String,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DirectoryConfig {
    #[validate(url)]
    pub base_url: String,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTORY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub tie_break: TieBreak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RenderConfig {
    pub font_path: PathBuf,

    #[validate(range(min = 1.0))]
    pub font_size: f32,

    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Per-territory template, name cleanup tokens and optional layout override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TerritoryConfig {
    pub territory: Territory,

    #[validate(custom(function = "validate_template"))]
    pub template: PathBuf,

    #[serde(default)]
    pub strip_tokens: Vec<String>,

    #[serde(default)]
    pub layout: Option<LayoutSpec>,
}

fn validate_template(path: &Path) -> std::result::Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("empty_template_path"));
    }
    Ok(())
}

impl TerritoryConfig {
    pub fn new(territory: Territory) -> Self {
        Self {
            territory,
            template: PathBuf::from(format!("templates/resumo_meteo_{}.png", territory.slug())),
            strip_tokens: Vec::new(),
            layout: None,
        }
    }

    pub fn name_cleanup(&self) -> NameCleanup {
        NameCleanup::new(self.strip_tokens.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub source: SourceConfig,

    #[validate(nested)]
    pub directory: DirectoryConfig,

    pub ranking: RankingConfig,

    pub plan: ReportPlan,

    #[validate(nested)]
    pub render: RenderConfig,

    pub layout: LayoutSpec,

    #[validate(nested)]
    pub territories: Vec<TerritoryConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            directory: DirectoryConfig::default(),
            ranking: RankingConfig::default(),
            plan: ReportPlan::default(),
            render: RenderConfig::default(),
            layout: LayoutSpec::default(),
            territories: Territory::ALL.iter().map(|t| TerritoryConfig::new(*t)).collect(),
        }
    }
}

impl AppConfig {
    /// Layer built-in defaults, the TOML file and `RESUMO_METEO_*` environment
    /// variables (nested keys separated by `__`). An explicitly named file must
    /// exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        debug!(path = %file.display(), required, "loading configuration");

        let config: AppConfig = Config::builder()
            .add_source(File::from(file.as_path()).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    /// Full validation: field rules, plan, layouts and territory uniqueness
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.plan.validate()?;
        self.layout.check()?;

        if self.territories.is_empty() {
            return Err(ReportError::config("No territories configured"));
        }

        let mut seen = HashSet::new();
        for territory in &self.territories {
            if !seen.insert(territory.territory) {
                return Err(ReportError::config(format!(
                    "Territory '{}' is configured more than once",
                    territory.territory
                )));
            }
            if let Some(layout) = &territory.layout {
                layout.check()?;
            }
        }

        Ok(())
    }

    pub fn territory(&self, territory: Territory) -> Option<&TerritoryConfig> {
        self.territories.iter().find(|t| t.territory == territory)
    }

    pub fn layout_for(&self, territory: Territory) -> &LayoutSpec {
        self.territory(territory)
            .and_then(|t| t.layout.as_ref())
            .unwrap_or(&self.layout)
    }

    /// One binder per configured territory, in territory order
    pub fn binders(&self) -> Result<Vec<(Territory, RenderBinder)>> {
        let mut territories: Vec<Territory> =
            self.territories.iter().map(|t| t.territory).collect();
        territories.sort();

        territories
            .into_iter()
            .map(|t| Ok((t, RenderBinder::new(self.layout_for(t), &self.plan)?)))
            .collect()
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory.timeout_secs)
    }
}
