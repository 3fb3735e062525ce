use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level sweeplens configuration, matching `sweeplens.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweeplensConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub grouping: GroupingSection,
    #[serde(default)]
    pub codegen: CodegenSection,
}

impl SweeplensConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.metadata_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "store.metadata_column must not be empty".into(),
            ));
        }
        if self.grouping.queue_tag.is_empty() {
            return Err(ConfigError::Invalid(
                "grouping.queue_tag must not be empty".into(),
            ));
        }
        if self.grouping.min_parent_runs < 2 {
            return Err(ConfigError::Invalid(format!(
                "grouping.min_parent_runs must be at least 2, got {}",
                self.grouping.min_parent_runs
            )));
        }
        if self.codegen.loader_import.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "codegen.loader_import must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Column of the `runs` table holding the sweep metadata JSON.
    pub metadata_column: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            metadata_column: "measureit".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingSection {
    /// `launched_by` value marking runs started by the sweep queue.
    pub queue_tag: String,
    /// Same-experiment `Sweep2D` runs needed to form a parent group.
    pub min_parent_runs: usize,
}

impl Default for GroupingSection {
    fn default() -> Self {
        Self {
            queue_tag: "SweepQueue".to_string(),
            min_parent_runs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenSection {
    pub show_plots: bool,
    /// Python module providing `load_by_id` and `initialise_or_create_database_at`.
    pub loader_import: String,
}

impl Default for CodegenSection {
    fn default() -> Self {
        Self {
            show_plots: true,
            loader_import: "qcodes.dataset".to_string(),
        }
    }
}
