//! The canonical, immutable launch table.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::LaunchRecord;

/// Row accounting for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows read from the source (header excluded).
    pub rows_read: usize,
    /// Rows dropped because `Date` did not parse.
    pub dropped_bad_date: usize,
    /// Rows dropped because `Mission` or `MissionStatus` was null.
    pub dropped_missing_required: usize,
    /// Rows dropped because a required cell was not valid UTF-8.
    pub dropped_undecodable: usize,
    /// Rows dropped as exact duplicates of an earlier row.
    pub dropped_duplicates: usize,
}

impl LoadReport {
    /// Rows dropped for any reason.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept()
    }

    pub fn rows_kept(&self) -> usize {
        self.rows_read
            - self.dropped_bad_date
            - self.dropped_missing_required
            - self.dropped_undecodable
            - self.dropped_duplicates
    }
}

/// Cleaned launch records in canonical (file) order.
///
/// Only the loader builds a `Dataset` from a file; queries read it through
/// shared references and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<LaunchRecord>,
    report: LoadReport,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Build a dataset from records that already satisfy the load invariants.
    pub fn from_records(records: Vec<LaunchRecord>) -> Self {
        let report = LoadReport {
            rows_read: records.len(),
            ..Default::default()
        };
        Self {
            records,
            report,
            source: None,
        }
    }

    pub(crate) fn from_load(records: Vec<LaunchRecord>, report: LoadReport, source: PathBuf) -> Self {
        Self {
            records,
            report,
            source: Some(source),
        }
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LaunchRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Path the dataset was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LaunchRecord;
    type IntoIter = std::slice::Iter<'a, LaunchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
