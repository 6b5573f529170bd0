//! Sankey chart tool: load a table, pick three category columns and a
//! numeric measure, and get a `Total → level1 → level2 → level3` flow diagram.
//!
//! The viewer binary (`src/main.rs`) and `sankey_export` are thin shells
//! over these modules.

pub mod color;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod sankey;
