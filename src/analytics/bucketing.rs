//! Date, year, hour and country bucketing for launch records.
//!
//! Source dates are parsed once at load time with [`parse_record_date`];
//! query arguments go through the stricter [`parse_query_date`].

use chrono::{Datelike, NaiveDate};

/// Formats accepted for the `Date` column of a source file.
const RECORD_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a `Date` field from the source table.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, and date-times whose
/// first ten characters are an ISO date (`2020-08-07 05:12:00+00:00`).
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in RECORD_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    if raw.len() > 10 && raw.is_char_boundary(10) {
        let (head, tail) = raw.split_at(10);
        if tail.starts_with([' ', 'T']) && is_iso_date_shape(head) {
            return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
        }
    }
    None
}

/// Parse a `YYYY-MM-DD` query argument.
///
/// Rejects anything that is not exactly ten ASCII characters in
/// `DDDD-DD-DD` shape, and impossible calendar dates such as `2020-02-30`.
pub fn parse_query_date(raw: &str) -> Option<NaiveDate> {
    if !is_iso_date_shape(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Calendar year of a date, widened for comparison with caller input.
pub fn year_of(date: NaiveDate) -> i64 {
    i64::from(date.year())
}

/// Country of a launch site: the last `", "`-separated token of the location.
pub fn country_of(location: &str) -> Option<&str> {
    let country = location.rsplit(", ").next()?.trim();
    (!country.is_empty()).then_some(country)
}

/// Hour of day from a free-text `HH:MM[:SS]` launch time.
pub fn hour_of(time: &str) -> Option<u32> {
    let hour: u32 = time.trim().split(':').next()?.trim().parse().ok()?;
    (hour < 24).then_some(hour)
}

/// Label for an hour-of-day bin (`05:00`).
pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
