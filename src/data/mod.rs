/// Data layer: workbook reading, RvR extraction, grouping and summaries.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods
///        │
///        ▼
///   ┌──────────┐
///   │ workbook │  bytes → sheets of raw rows (calamine)
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌──────────┐         ┌─────────────┐
///   │ extract  │         │ device_info │  label → value pairs
///   └──────────┘         └─────────────┘
///        │  header row, columns (columns), points (band)
///        ▼
///   ┌──────────┐
///   │  group   │  points → TestConfiguration by baseline key
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  LoadedWorkbook, or EmptyWorkbook
///   └──────────┘
///        │
///        ▼
///   stats / filter / export  (display side)
/// ```

pub mod band;
pub mod columns;
pub mod device_info;
pub mod extract;
pub mod filter;
pub mod group;
pub mod loader;
pub mod model;
pub mod stats;
pub mod workbook;
