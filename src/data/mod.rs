/// Data layer: table types, normalization, aggregation and export.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read sheets → raw Table per sheet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  drop placeholders, canonical names, tag `Cliente`
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ filter / summary  │  drop retired rows → counts, percentages, cross tabs
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  Table → .xlsx / .csv / .json
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod summary;
