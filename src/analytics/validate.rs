//! Dataset validation library.
//!
//! Re-checks the loader invariants on an installed dataset:
//! - **Required fields**: every record has a mission name and status.
//! - **Uniqueness**: no two records are identical.
//! - **Status totals**: per-status counts add up to the dataset size.
//! - **Drop rate**: warns when the loader discarded a large share of rows
//!   as defective. Removed duplicates do not count.
//! - **Price coverage**: informational share of records with a price.
//!
//! Output is a structured [`ValidationReport`] that serialises to JSON
//! for `atlas validate --json`.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;

use crate::store::{Dataset, LoadReport};

use super::derive::safe_pct;
use super::query::mission_status_count;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Severity level for a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single validation check result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub id: String,
    pub ok: bool,
    pub severity: Severity,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl Check {
    fn new(id: &str, ok: bool, severity: Severity, details: String) -> Self {
        Self {
            id: id.to_string(),
            ok,
            severity,
            details,
            suggested_action: None,
        }
    }

    fn suggest(mut self, action: &str) -> Self {
        if !self.ok {
            self.suggested_action = Some(action.to_string());
        }
        self
    }
}

/// Report metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub elapsed_ms: u64,
    pub records: usize,
    pub load: LoadReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Full validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<Check>,
    pub _meta: ReportMeta,
}

impl ValidationReport {
    /// True if every check passed.
    pub fn all_ok(&self) -> bool {
        self.checks.iter().all(|c| c.ok)
    }

    /// Count of checks that failed with a given severity.
    pub fn count_failures(&self, sev: Severity) -> usize {
        self.checks
            .iter()
            .filter(|c| !c.ok && c.severity == sev)
            .count()
    }

    /// Produce the JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({"error": "serialization failed"}))
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Run every check against `dataset`.
pub fn run_validation(dataset: &Dataset) -> ValidationReport {
    let started = Instant::now();
    let checks = vec![
        check_required(dataset, "records.mission_present", "mission", |r| &r.mission),
        check_required(dataset, "records.status_present", "mission status", |r| {
            &r.mission_status
        }),
        check_unique(dataset),
        check_status_sum(dataset),
        check_drop_rate(dataset.report()),
        check_price_coverage(dataset),
    ];

    let report = ValidationReport {
        checks,
        _meta: ReportMeta {
            elapsed_ms: started.elapsed().as_millis() as u64,
            records: dataset.len(),
            load: *dataset.report(),
            source: dataset.source().map(|p| p.display().to_string()),
        },
    };
    tracing::debug!(
        ok = report.all_ok(),
        errors = report.count_failures(Severity::Error),
        "dataset validation finished"
    );
    report
}

fn check_required(
    dataset: &Dataset,
    id: &str,
    label: &str,
    field: impl Fn(&crate::model::LaunchRecord) -> &String,
) -> Check {
    let blank = dataset
        .iter()
        .filter(|&r| field(r).trim().is_empty())
        .count();
    Check::new(
        id,
        blank == 0,
        Severity::Error,
        format!("{blank} of {} records have an empty {label}", dataset.len()),
    )
    .suggest("reload the dataset through the loader instead of building records by hand")
}

fn check_unique(dataset: &Dataset) -> Check {
    let mut seen = HashSet::new();
    let duplicates = dataset
        .iter()
        .filter(|r| !seen.insert(r.identity()))
        .count();
    Check::new(
        "records.unique",
        duplicates == 0,
        Severity::Error,
        format!("{duplicates} duplicate records"),
    )
    .suggest("reload the dataset so exact duplicates are removed")
}

fn check_status_sum(dataset: &Dataset) -> Check {
    let sum: u64 = mission_status_count(dataset).values().sum();
    Check::new(
        "status_counts.sum_matches",
        sum == dataset.len() as u64,
        Severity::Error,
        format!("status counts sum to {sum}, dataset has {} records", dataset.len()),
    )
}

/// Share of source rows that may be defective before the report warns.
const MAX_DROP_PCT: f64 = 10.0;

fn check_drop_rate(load: &LoadReport) -> Check {
    let defective = (load.rows_dropped() - load.dropped_duplicates) as u64;
    let pct = safe_pct(defective, load.rows_read as u64);
    Check::new(
        "load.drop_rate",
        pct <= MAX_DROP_PCT,
        Severity::Warning,
        format!(
            "{defective} of {} source rows dropped as defective ({pct}%): {} bad date, {} missing mission or status, {} undecodable",
            load.rows_read,
            load.dropped_bad_date,
            load.dropped_missing_required,
            load.dropped_undecodable,
        ),
    )
    .suggest("check the Date column format and the file encoding")
}

fn check_price_coverage(dataset: &Dataset) -> Check {
    let priced = dataset.iter().filter(|r| r.price.is_some()).count() as u64;
    let pct = safe_pct(priced, dataset.len() as u64);
    Check::new(
        "records.price_coverage",
        true,
        Severity::Info,
        format!("{pct}% of records carry a price"),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
