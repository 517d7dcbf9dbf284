//! Indicator transforms and summary assembly.
//!
//! Every function here is pure: inputs are borrowed, outputs are new rows.

pub mod join;
pub mod pct_change;
pub mod real_wage;
pub mod rebase;
pub mod summary;

pub use join::{nearest_join, NearestMatch};
pub use pct_change::{compute_pct_change, pct_change_values, YOY_PERIODS};
pub use real_wage::{compute_real_wage, price_index_base};
pub use rebase::{rebase_base_value, rebase_index};
pub use summary::{SummaryError, SummaryRow, SummaryTable};

/// Absolute tolerance for float comparisons in tests.
#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {expected}, got {actual} (eps {eps})"
    );
}

#[cfg(test)]
pub(crate) fn monthly(start_year: i32, values: &[f64]) -> crate::domain::TidySeries {
    use chrono::NaiveDate;
    crate::domain::TidySeries::from_pairs(values.iter().enumerate().map(|(i, &v)| {
        let year = start_year + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        (NaiveDate::from_ymd_opt(year, month, 1).unwrap(), v)
    }))
}
