//! Shared types for the analytics library.
//!
//! These are the result and filter shapes used by the exploration queries
//! and rendered by the CLI, both as text and as JSON.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::model::Column;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Exploration-specific error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExploreError {
    /// The column has no histogram definition.
    #[error("no histogram is defined for column '{0}'")]
    UnsupportedColumn(Column),
}

/// Convenience alias.
pub type ExploreResult<T> = std::result::Result<T, ExploreError>;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Row filter applied before listing records.
///
/// An empty `values` list disables the column filter; absent bounds leave
/// that side of the date range open.
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    pub column: Option<Column>,
    pub values: Vec<String>,
    /// Inclusive lower bound.
    pub since: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub until: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Company activity matrix
// ---------------------------------------------------------------------------

/// One company's launches per year, aligned with [`ActivityMatrix::years`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    pub company: String,
    pub total: u64,
    pub per_year: Vec<u64>,
}

/// Company × year launch counts for the most active companies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityMatrix {
    /// Distinct years with at least one launch by a listed company, ascending.
    pub years: Vec<i64>,
    /// Ordered by total descending, ties by company name.
    pub rows: Vec<ActivityRow>,
}

impl ActivityMatrix {
    /// Count for `company` in `year`, or 0.
    pub fn cell(&self, company: &str, year: i64) -> u64 {
        let Ok(col) = self.years.binary_search(&year) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|row| row.company == company)
            .map_or(0, |row| row.per_year[col])
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// A single histogram bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub label: String,
    pub count: u64,
}

/// Distribution of one column's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub column: Column,
    pub title: String,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}
