/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls / .json / .parquet  (bytes + filename)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  dispatch on extension → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named, equally long columns of CellValue
///   └──────────┘
///        │
///        ▼
///   crate::sankey   (aggregate into a flow diagram)
/// ```

pub mod loader;
pub mod model;
