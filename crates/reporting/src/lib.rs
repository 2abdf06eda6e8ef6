//! Dashboard reporting — the presentation boundary of the pipeline.
//!
//! Everything the (external) rendering layer consumes is assembled here:
//! general metrics, outcome proportions, per-source breakdowns, the monthly
//! trend, and the attribution-model section. Sections degrade one by one;
//! a filter choice that breaks the model never takes the counts down with it.

pub mod metrics;
pub mod report;
pub mod trend;

pub use metrics::{GeneralMetrics, OutcomeBreakdown, SourceCount};
pub use report::{build_report, DashboardReport, ModelSection, SectionOutcome};
pub use trend::MonthlySourceCount;
