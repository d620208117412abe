/// Data layer: core types, loading, filtering, and view building.
///
/// Architecture:
/// ```text
///      .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse workbook → Workbook (named Sheets)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  combine selected sheets, tag rows with Year,
///   └──────────┘  apply state/county filters, pick a metric
///        │
///        ▼
///   ┌──────────┐
///   │  views    │  bar aggregate / trend series / year×county pivot
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod pipeline;
pub mod views;
