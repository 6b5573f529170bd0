use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::diagram::{Edge, SankeyDiagram};
use crate::color::StagePalette;
use crate::data::model::{CellValue, Column, Table};

/// Default bound on `D1 · D2 · D3`.
pub const DEFAULT_MAX_CATEGORY_PRODUCT: u64 = 10_000_000;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The three hierarchy columns plus the numeric measure to sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSelector {
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub value: String,
}

impl LevelSelector {
    pub fn new(
        level1: impl Into<String>,
        level2: impl Into<String>,
        level3: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        LevelSelector {
            level1: level1.into(),
            level2: level2.into(),
            level3: level3.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    /// Label of node 0.
    pub root_label: String,
    pub palette: StagePalette,
    /// Reject inputs whose distinct-category product exceeds this.
    pub max_category_product: Option<u64>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        AggregateOptions {
            root_label: "Total".to_string(),
            palette: StagePalette::default(),
            max_category_product: Some(DEFAULT_MAX_CATEGORY_PRODUCT),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnProblem {
    Missing,
    NotNumeric,
}

impl fmt::Display for ColumnProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnProblem::Missing => f.write_str("no such column"),
            ColumnProblem::NotNumeric => f.write_str("column is not numeric"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueProblem {
    Missing,
    NotFinite,
    Negative,
    /// A running sum left the finite range.
    Overflow,
}

impl fmt::Display for ValueProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueProblem::Missing => f.write_str("missing value"),
            ValueProblem::NotFinite => f.write_str("value is not finite"),
            ValueProblem::Negative => f.write_str("value is negative"),
            ValueProblem::Overflow => f.write_str("sum overflows"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SankeyError {
    #[error("the table has no rows")]
    EmptyTable,
    #[error("invalid column '{column}': {problem}")]
    InvalidColumn { column: String, problem: ColumnProblem },
    #[error("invalid value in column '{column}' at row {row}: {problem}")]
    InvalidValue {
        column: String,
        row: usize,
        problem: ValueProblem,
    },
    #[error("too many categories: {d1} x {d2} x {d3} exceeds the limit of {limit}")]
    TooManyCategories {
        d1: usize,
        d2: usize,
        d3: usize,
        limit: u64,
    },
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Stateless Sankey builder; holds only its options.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    options: AggregateOptions,
}

/// Aggregate with [`AggregateOptions::default`].
pub fn aggregate(table: &Table, selector: &LevelSelector) -> Result<SankeyDiagram, SankeyError> {
    Aggregator::default().aggregate(table, selector)
}

/// Distinct values of one stage in node order, with their positions.
struct Stage<'a> {
    values: Vec<&'a CellValue>,
    index: HashMap<&'a CellValue, usize>,
}

impl<'a> Stage<'a> {
    fn from_values(values: Vec<&'a CellValue>) -> Self {
        let index = values.iter().enumerate().map(|(i, v)| (*v, i)).collect();
        Stage { values, index }
    }

    /// Ascending key order.
    fn sorted(column: &'a Column) -> Self {
        let set: BTreeSet<&CellValue> = column.values.iter().collect();
        Stage::from_values(set.into_iter().collect())
    }

    /// Order of first appearance in the table.
    fn first_seen(column: &'a Column) -> Self {
        let mut seen = HashSet::new();
        let values = column.values.iter().filter(|v| seen.insert(*v)).collect();
        Stage::from_values(values)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn position(&self, value: &CellValue) -> usize {
        // Every row value was collected when the stage was built.
        self.index[value]
    }
}

impl Aggregator {
    pub fn new(options: AggregateOptions) -> Self {
        Aggregator { options }
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Build the three-stage diagram `root → level1 → level2 → level3`.
    ///
    /// Level-1 nodes are ordered by ascending key; level-2 and level-3 nodes
    /// by first appearance.  The last hop sums per `(level2, level3)` pair
    /// over all level-1 values.  Only observed pairs are accumulated, so
    /// absent combinations never produce an edge.
    pub fn aggregate(
        &self,
        table: &Table,
        selector: &LevelSelector,
    ) -> Result<SankeyDiagram, SankeyError> {
        if table.is_empty() {
            return Err(SankeyError::EmptyTable);
        }
        let level1 = require_column(table, &selector.level1)?;
        let level2 = require_column(table, &selector.level2)?;
        let level3 = require_column(table, &selector.level3)?;
        let measure = require_column(table, &selector.value)?;
        if !measure.is_numeric() {
            return Err(SankeyError::InvalidColumn {
                column: measure.name.clone(),
                problem: ColumnProblem::NotNumeric,
            });
        }
        let values = measure_values(measure)?;

        let stage1 = Stage::sorted(level1);
        let stage2 = Stage::first_seen(level2);
        let stage3 = Stage::first_seen(level3);
        let (d1, d2, d3) = (stage1.len(), stage2.len(), stage3.len());

        if let Some(limit) = self.options.max_category_product {
            let product = (d1 as u64).saturating_mul(d2 as u64).saturating_mul(d3 as u64);
            if product > limit {
                return Err(SankeyError::TooManyCategories { d1, d2, d3, limit });
            }
        }
        log::debug!("Stage sizes: level1={d1} level2={d2} level3={d3}");

        let offset2 = 1 + d1;
        let offset3 = 1 + d1 + d2;
        let mut flows: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        let mut accumulate = |key: (usize, usize), value: f64, row: usize| {
            let sum = flows.entry(key).or_insert(0.0);
            *sum += value;
            if sum.is_finite() {
                Ok(())
            } else {
                Err(SankeyError::InvalidValue {
                    column: measure.name.clone(),
                    row,
                    problem: ValueProblem::Overflow,
                })
            }
        };

        for (row, &value) in values.iter().enumerate() {
            let n1 = 1 + stage1.position(&level1.values[row]);
            let n2 = offset2 + stage2.position(&level2.values[row]);
            let n3 = offset3 + stage3.position(&level3.values[row]);
            accumulate((0, n1), value, row)?;
            accumulate((n1, n2), value, row)?;
            accumulate((n2, n3), value, row)?;
        }

        let observed = flows.len();
        let edges: Vec<Edge> = flows
            .into_iter()
            .filter(|&(_, value)| value != 0.0)
            .map(|((source, target), value)| Edge {
                source,
                target,
                value,
            })
            .collect();
        log::debug!(
            "Aggregated {} rows into {} edges ({} zero-sum pairs dropped)",
            values.len(),
            edges.len(),
            observed - edges.len()
        );

        let stage_sizes = [1, d1, d2, d3];
        let mut labels = Vec::with_capacity(offset3 + d3);
        labels.push(self.options.root_label.clone());
        for stage in [&stage1, &stage2, &stage3] {
            labels.extend(stage.values.iter().map(|v| v.to_string()));
        }

        let colors = self
            .options
            .palette
            .stages()
            .iter()
            .zip(stage_sizes)
            .flat_map(|(color, n)| std::iter::repeat(color.to_string()).take(n))
            .collect();

        Ok(SankeyDiagram::new(labels, colors, edges, stage_sizes))
    }
}

fn require_column<'a>(table: &'a Table, name: &str) -> Result<&'a Column, SankeyError> {
    table.column(name).ok_or_else(|| SankeyError::InvalidColumn {
        column: name.to_string(),
        problem: ColumnProblem::Missing,
    })
}

/// Convert the measure column to `f64`, rejecting anything a flow width
/// cannot represent.
fn measure_values(column: &Column) -> Result<Vec<f64>, SankeyError> {
    column
        .values
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let problem = match cell.as_f64() {
                None => ValueProblem::Missing,
                Some(v) if !v.is_finite() => ValueProblem::NotFinite,
                Some(v) if v < 0.0 => ValueProblem::Negative,
                Some(v) => return Ok(v),
            };
            Err(SankeyError::InvalidValue {
                column: column.name.clone(),
                row,
                problem,
            })
        })
        .collect()
}
