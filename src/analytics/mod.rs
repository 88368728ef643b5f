//! Shared analytics query library.
//!
//! Pure read-only queries over a loaded [`Dataset`](crate::store::Dataset),
//! consumed by the `atlas` CLI and usable directly as a library.
//!
//! # Module structure
//!
//! - [`types`]: filter, result structs, error type
//! - [`bucketing`]: date parsing, year / hour / country keys
//! - [`derive`]: safe percentage and average computation
//! - [`query`]: the core launch queries
//! - [`explore`]: country, activity, histogram and filter views
//! - [`validate`]: dataset invariant checks

pub mod bucketing;
pub mod derive;
pub mod explore;
pub mod query;
pub mod types;
pub mod validate;

// Re-export the most commonly used items at the crate::analytics level.
pub use explore::{
    HISTOGRAM_COLUMNS, company_activity, date_bounds, filter_records, histogram,
    missions_by_country,
};
pub use query::{
    average_missions_per_year, mission_count_by_company, mission_status_count,
    missions_by_date_range, missions_by_year, most_used_rocket, success_rate, success_rate_with,
    top_companies_by_mission_count,
};
pub use types::{
    ActivityMatrix, ActivityRow, ExploreError, ExploreResult, Histogram, HistogramBin,
    RecordFilter,
};
pub use validate::{Severity, ValidationReport, run_validation};
