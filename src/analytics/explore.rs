//! Exploration queries behind the dashboard views: launches per country,
//! company activity per year, column histograms, and record filtering.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::model::{Column, LaunchRecord};
use crate::store::Dataset;

use super::bucketing::{country_of, hour_label, hour_of, year_of};
use super::query::{ranked_counts, top_companies_by_mission_count};
use super::types::{
    ActivityMatrix, ActivityRow, ExploreError, ExploreResult, Histogram, HistogramBin,
    RecordFilter,
};

/// Columns that have a histogram definition.
pub const HISTOGRAM_COLUMNS: [Column; 6] = [
    Column::Company,
    Column::Date,
    Column::Time,
    Column::RocketStatus,
    Column::MissionStatus,
    Column::Rocket,
];

/// Earliest and latest launch dates, or `None` for an empty dataset.
pub fn date_bounds(dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
    dataset
        .iter()
        .map(|r| r.date)
        .minmax()
        .into_option()
}

/// Launches per country (last token of the location), count descending.
pub fn missions_by_country(dataset: &Dataset) -> Vec<(String, u64)> {
    ranked_counts(dataset.iter().filter_map(|r| country_of(&r.location)))
}

/// Launches per year for the `top_n` most active companies.
pub fn company_activity(dataset: &Dataset, top_n: i64) -> ActivityMatrix {
    let top = top_companies_by_mission_count(dataset, top_n);
    if top.is_empty() {
        return ActivityMatrix::default();
    }

    let mut per_company: HashMap<&str, BTreeMap<i64, u64>> = top
        .iter()
        .map(|(company, _)| (company.as_str(), BTreeMap::new()))
        .collect();
    let mut years = BTreeSet::new();
    for record in dataset {
        if let Some(by_year) = per_company.get_mut(record.company.as_str()) {
            let year = year_of(record.date);
            *by_year.entry(year).or_default() += 1;
            years.insert(year);
        }
    }
    let years: Vec<i64> = years.into_iter().collect();

    let rows = top
        .iter()
        .map(|(company, total)| {
            let by_year = &per_company[company.as_str()];
            ActivityRow {
                company: company.clone(),
                total: *total,
                per_year: years
                    .iter()
                    .map(|y| by_year.get(y).copied().unwrap_or(0))
                    .collect(),
            }
        })
        .collect();

    ActivityMatrix { years, rows }
}

/// Distribution of `column`.
///
/// `Time` is binned by hour of day and `Date` by year. `Company` and
/// `Rocket` keep only values seen more than `min_count` times.
pub fn histogram(dataset: &Dataset, column: Column, min_count: u64) -> ExploreResult<Histogram> {
    let (title, bins) = match column {
        Column::Time => {
            let mut hours = [0u64; 24];
            for hour in dataset
                .iter()
                .filter_map(|r| r.time.as_deref().and_then(hour_of))
            {
                hours[hour as usize] += 1;
            }
            let bins = (0u32..24)
                .zip(hours)
                .map(|(h, count)| HistogramBin {
                    label: hour_label(h),
                    count,
                })
                .collect();
            ("Distribution of Launch Times (by Hour)".to_string(), bins)
        }
        Column::Date => {
            let mut by_year: BTreeMap<i64, u64> = BTreeMap::new();
            for record in dataset {
                *by_year.entry(year_of(record.date)).or_default() += 1;
            }
            let bins = by_year
                .into_iter()
                .map(|(year, count)| HistogramBin {
                    label: year.to_string(),
                    count,
                })
                .collect();
            ("Distribution of Date".to_string(), bins)
        }
        Column::Company | Column::Rocket => {
            let bins = value_bins(dataset, column)
                .into_iter()
                .filter(|b| b.count > min_count)
                .collect();
            (format!("Distribution of {column} ({min_count}+ launches)"), bins)
        }
        Column::RocketStatus | Column::MissionStatus => {
            (format!("Distribution of {column}"), value_bins(dataset, column))
        }
        other => return Err(ExploreError::UnsupportedColumn(other)),
    };

    Ok(Histogram {
        column,
        title,
        bins,
    })
}

fn value_bins(dataset: &Dataset, column: Column) -> Vec<HistogramBin> {
    let texts: Vec<_> = dataset.iter().map(|r| r.field_text(column)).collect();
    ranked_counts(texts.iter().map(|t| &**t))
        .into_iter()
        .map(|(label, count)| HistogramBin { label, count })
        .collect()
}

/// Records matching `filter`, in dataset order.
pub fn filter_records<'a>(dataset: &'a Dataset, filter: &RecordFilter) -> Vec<&'a LaunchRecord> {
    dataset
        .iter()
        .filter(|r| filter.since.is_none_or(|since| r.date >= since))
        .filter(|r| filter.until.is_none_or(|until| r.date <= until))
        .filter(|r| match filter.column {
            Some(column) if !filter.values.is_empty() => {
                let text = r.field_text(column);
                filter.values.iter().any(|v| *v == text)
            }
            _ => true,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
