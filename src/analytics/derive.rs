//! Derived-number helpers for analytics results.
//!
//! All division operations are safe against zero denominators and produce
//! `0.0` rather than NaN / Infinity.

/// Round to 2 decimal places: `(x * 100.0).round() / 100.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage safe against zero denominator.  Returns 0.0 when denominator is
/// zero. Result is rounded to 2 decimal places.
pub fn safe_pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round2((numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Mean of `total` over `span` units, rounded to 2 decimal places.
/// Returns 0.0 for an empty span.
pub fn safe_avg(total: u64, span: u64) -> f64 {
    if span == 0 {
        0.0
    } else {
        round2(total as f64 / span as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
