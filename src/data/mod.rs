/// Data layer: fetching, caching, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  Envirofacts API ── {base}/{table}/{start}:{end}/JSON
///        │
///        ▼
///   ┌──────────┐
///   │  fetch    │  sequential pages → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  {folder}/{table}.csv, read unless refresh forced
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  Table → EmissionRecord / FacilityIndex
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + basin → &EmissionRecord
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  segment / company / state charts
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
