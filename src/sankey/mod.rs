//! Sankey aggregation: turn a flat [`Table`](crate::data::model::Table) into
//! a four-stage flow diagram.
//!
//! ```text
//!   Total ──▶ level1 ──▶ level2 ──▶ level3
//!    (0)     1..=D1     D1+1..     D1+D2+1..
//! ```
//!
//! [`aggregate`] produces a [`SankeyDiagram`]; [`layout::compute`] places it
//! on a canvas for the viewer.

mod aggregate;
mod diagram;
pub mod layout;

pub use aggregate::{
    aggregate, AggregateOptions, Aggregator, ColumnProblem, LevelSelector, SankeyError,
    ValueProblem,
};
pub use diagram::{Edge, LinkArrays, SankeyDiagram};
