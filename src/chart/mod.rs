/// Chart layer: renderer-agnostic specs built from a selected sheet.
///
/// ```text
///   Table + Axes
///        │
///        ▼
///   ┌──────────┐
///   │ builder   │  rule table dispatch → (primary, secondary) ChartSpec
///   └──────────┘
///        │  uses
///        ▼
///   ┌──────────┐
///   │ series    │  column extraction, grouping, quartiles, bins
///   └──────────┘
///
///   Table ──► summary ──► category pie / placeholder
/// ```

pub mod builder;
pub mod series;
pub mod spec;
pub mod summary;
