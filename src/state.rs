use std::path::Path;

use anyhow::{Context, Result};

use sankey_tool::config::AppConfig;
use sankey_tool::data::loader;
use sankey_tool::data::model::Table;
use sankey_tool::sankey::{Aggregator, LevelSelector, SankeyDiagram};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dropdown selections; `None` until a table offers columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnChoice {
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    pub value: Option<String>,
}

impl ColumnChoice {
    /// Pre-select the first three columns as levels and the first numeric
    /// column as the measure.
    pub fn defaults_for(table: &Table) -> Self {
        let names = table.column_names();
        ColumnChoice {
            level1: names.first().cloned(),
            level2: names.get(1).cloned(),
            level3: names.get(2).cloned(),
            value: table.numeric_column_names().into_iter().next(),
        }
    }

    pub fn selector(&self) -> Option<LevelSelector> {
        Some(LevelSelector::new(
            self.level1.clone()?,
            self.level2.clone()?,
            self.level3.clone()?,
            self.value.clone()?,
        ))
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    aggregator: Aggregator,

    /// Loaded table (None until user loads a file).
    pub table: Option<Table>,

    /// Name of the loaded file, for the top bar.
    pub file_name: Option<String>,

    pub columns: ColumnChoice,

    /// Last generated diagram; cleared when the input changes.
    pub diagram: Option<SankeyDiagram>,

    /// Node under the pointer in the chart.
    pub hovered_node: Option<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            aggregator: Aggregator::new(config.aggregate.clone()),
            config,
            table: None,
            file_name: None,
            columns: ColumnChoice::default(),
            diagram: None,
            hovered_node: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded table and reset the column choices.
    pub fn set_table(&mut self, file_name: String, table: Table) {
        self.columns = ColumnChoice::defaults_for(&table);
        self.table = Some(table);
        self.file_name = Some(file_name);
        self.diagram = None;
        self.hovered_node = None;
        self.status_message = None;
    }

    /// Load a file from disk; failures end up in the status line.
    pub fn open_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match loader::load_file(path) {
            Ok(table) => self.set_table(name, table),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Change one of the dropdowns; the chart goes stale until regenerated.
    pub fn set_column(&mut self, slot: ColumnSlot, name: String) {
        let target = match slot {
            ColumnSlot::Level1 => &mut self.columns.level1,
            ColumnSlot::Level2 => &mut self.columns.level2,
            ColumnSlot::Level3 => &mut self.columns.level3,
            ColumnSlot::Value => &mut self.columns.value,
        };
        if target.as_deref() != Some(name.as_str()) {
            *target = Some(name);
            self.diagram = None;
            self.hovered_node = None;
        }
    }

    /// Run the aggregation for the current selection.
    pub fn generate(&mut self) {
        let Some(table) = &self.table else {
            self.status_message = Some("Open a file first".to_string());
            return;
        };
        let Some(selector) = self.columns.selector() else {
            self.status_message = Some("Select all four columns".to_string());
            return;
        };

        match self.aggregator.aggregate(table, &selector) {
            Ok(diagram) => {
                log::info!(
                    "Generated Sankey for {selector:?}: {} nodes, {} edges",
                    diagram.node_count(),
                    diagram.edges().len()
                );
                self.diagram = Some(diagram);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Sankey generation failed: {e}");
                self.diagram = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.hovered_node = None;
    }

    /// Write the current diagram as a Plotly trace.
    pub fn export_diagram(&self, path: &Path) -> Result<()> {
        let diagram = self.diagram.as_ref().context("no diagram to export")?;
        let text = serde_json::to_string_pretty(&diagram.to_plotly_json())?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported diagram to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    Level1,
    Level2,
    Level3,
    Value,
}

impl ColumnSlot {
    pub const ALL: [ColumnSlot; 4] = [
        ColumnSlot::Level1,
        ColumnSlot::Level2,
        ColumnSlot::Level3,
        ColumnSlot::Value,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColumnSlot::Level1 => "Level 1",
            ColumnSlot::Level2 => "Level 2",
            ColumnSlot::Level3 => "Level 3",
            ColumnSlot::Value => "Value",
        }
    }

    pub fn current(self, columns: &ColumnChoice) -> Option<&str> {
        match self {
            ColumnSlot::Level1 => columns.level1.as_deref(),
            ColumnSlot::Level2 => columns.level2.as_deref(),
            ColumnSlot::Level3 => columns.level3.as_deref(),
            ColumnSlot::Value => columns.value.as_deref(),
        }
    }
}
