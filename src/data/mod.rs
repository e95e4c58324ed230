/// Data layer: core types, loading, and display transforms.
///
/// Architecture:
/// ```text
///  FB_all_data.xlsx / IG_all_data.xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  calamine → rename + coerce → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   Dataset     │  per platform: sheet name → Table
///   └──────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ transform  │  label truncation, value counts, top-N + other
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
pub mod transform;
