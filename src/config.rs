use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sankey::layout::LayoutOptions;
use crate::sankey::AggregateOptions;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "SANKEY_TOOL_CONFIG";

/// Application settings. Every field has a default, so a config file only
/// needs the keys it changes:
///
/// ```json
/// { "aggregate": { "root_label": "All sales", "palette": { "root": "#333333" } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_size: [f32; 2],
    pub aggregate: AggregateOptions,
    pub layout: LayoutOptions,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            window_size: [1200.0, 800.0],
            aggregate: AggregateOptions::default(),
            layout: LayoutOptions::default(),
            preview_rows: 20,
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(text).context("parsing config JSON")?;
        config.aggregate.palette.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config {}", path.display()))
    }

    /// Load from `$SANKEY_TOOL_CONFIG` when set, defaults otherwise.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let config = Self::load(Path::new(&path))?;
                log::info!("Using config from {}", Path::new(&path).display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
