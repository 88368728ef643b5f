//! Core launch queries.
//!
//! Every function takes the dataset first and is total: invalid arguments
//! map to an empty or zero result instead of an error. Nothing here mutates
//! the dataset, and results are deterministic for a given dataset.

use std::collections::{BTreeMap, HashMap};

use crate::model::{LaunchRecord, SuccessRule};
use crate::store::Dataset;

use super::bucketing::{parse_query_date, year_of};
use super::derive::{safe_avg, safe_pct};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Count occurrences of a key, sorted by count descending then key ascending.
pub(crate) fn ranked_counts<'a, I>(keys: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut ranked: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn company_records<'a>(
    dataset: &'a Dataset,
    company: &'a str,
) -> impl Iterator<Item = &'a LaunchRecord> + 'a {
    dataset.iter().filter(move |r| r.company == company)
}

// ---------------------------------------------------------------------------
// Per-company queries
// ---------------------------------------------------------------------------

/// Number of launches operated by `company` (exact name match).
pub fn mission_count_by_company(dataset: &Dataset, company: &str) -> u64 {
    if company.is_empty() {
        return 0;
    }
    company_records(dataset, company).count() as u64
}

/// Percentage of `company`'s launches that succeeded, rounded to 2 dp.
///
/// Uses [`SuccessRule::Exact`]. Returns `0.0` for unknown companies.
pub fn success_rate(dataset: &Dataset, company: &str) -> f64 {
    success_rate_with(dataset, company, SuccessRule::Exact)
}

/// [`success_rate`] with an explicit success rule.
pub fn success_rate_with(dataset: &Dataset, company: &str, rule: SuccessRule) -> f64 {
    if company.is_empty() {
        return 0.0;
    }
    let (total, successes) = company_records(dataset, company).fold((0u64, 0u64), |(t, s), r| {
        (t + 1, s + u64::from(rule.is_success(&r.mission_status)))
    });
    safe_pct(successes, total)
}

// ---------------------------------------------------------------------------
// Time queries
// ---------------------------------------------------------------------------

/// Mission names launched between `start` and `end` (inclusive,
/// `YYYY-MM-DD`), ordered by date and then by dataset order.
///
/// Malformed dates and inverted ranges yield an empty list.
pub fn missions_by_date_range(dataset: &Dataset, start: &str, end: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (parse_query_date(start), parse_query_date(end)) else {
        tracing::debug!(start, end, "date range rejected: expected YYYY-MM-DD");
        return Vec::new();
    };
    if start > end {
        return Vec::new();
    }

    let mut hits: Vec<&LaunchRecord> = dataset
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .collect();
    // Stable sort keeps dataset order among equal dates.
    hits.sort_by_key(|r| r.date);
    hits.into_iter().map(|r| r.mission.clone()).collect()
}

/// Number of launches in calendar year `year`.
pub fn missions_by_year(dataset: &Dataset, year: i64) -> u64 {
    dataset.iter().filter(|r| year_of(r.date) == year).count() as u64
}

/// Mean launches per year over `[start_year, end_year]`, rounded to 2 dp.
///
/// Negative years, an inverted range, or a span too large to represent
/// return `0.0`.
pub fn average_missions_per_year(dataset: &Dataset, start_year: i64, end_year: i64) -> f64 {
    if start_year < 0 || end_year < 0 || start_year > end_year {
        return 0.0;
    }
    let Some(span) = end_year
        .checked_sub(start_year)
        .and_then(|d| d.checked_add(1))
    else {
        return 0.0;
    };
    let total = dataset
        .iter()
        .filter(|r| (start_year..=end_year).contains(&year_of(r.date)))
        .count() as u64;
    safe_avg(total, span as u64)
}

// ---------------------------------------------------------------------------
// Rankings and distributions
// ---------------------------------------------------------------------------

/// Top `n` companies by launch count: count descending, name ascending.
///
/// `n <= 0` returns an empty list.
pub fn top_companies_by_mission_count(dataset: &Dataset, n: i64) -> Vec<(String, u64)> {
    if n <= 0 {
        return Vec::new();
    }
    let mut ranked = ranked_counts(dataset.iter().map(|r| r.company.as_str()));
    ranked.truncate(usize::try_from(n).unwrap_or(usize::MAX));
    ranked
}

/// Launch count per mission status label.
pub fn mission_status_count(dataset: &Dataset) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for record in dataset {
        *counts.entry(record.mission_status.clone()).or_default() += 1;
    }
    counts
}

/// Most frequently used rocket; ties go to the alphabetically first name.
///
/// Returns an empty string for an empty dataset.
pub fn most_used_rocket(dataset: &Dataset) -> String {
    ranked_counts(dataset.iter().map(|r| r.rocket.as_str()))
        .into_iter()
        .next()
        .map(|(rocket, _)| rocket)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
