/// Data layer: raw ingestion, sanitation, and the marker table.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │   raw     │  parse cells → RawTable (missing / ±inf kept)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  resolve columns, sanitation pipeline
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ MarkerTable  │  frame numbers, flat X/Y/Z per marker
///   └─────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod raw;
