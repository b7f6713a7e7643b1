/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  train.csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows, derive calendar fields → RentalDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ RentalDataset │  Vec<RentalRecord>, value indices (shared, read-only)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply sidebar predicates → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  KPIs, group-by means, correlation → DashboardSummary
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
