//! Rebasing a series so a reference observation equals 100.

use crate::domain::{RebasedRow, TidySeries};
use chrono::NaiveDate;

/// Base-value policy for [`rebase_index`].
///
/// The value at `base_date` if a row with exactly that date exists, otherwise
/// the first (earliest) value. `None` only for an empty series.
pub fn rebase_base_value(series: &TidySeries, base_date: Option<NaiveDate>) -> Option<f64> {
    base_date
        .and_then(|d| series.value_at(d))
        .or_else(|| series.first().map(|o| o.value))
}

/// Attach `rebased_100 = value / base * 100` to every row.
///
/// An empty series gives an empty result. A zero base gives missing values
/// rather than infinities.
pub fn rebase_index(series: &TidySeries, base_date: Option<NaiveDate>) -> Vec<RebasedRow> {
    let base = rebase_base_value(series, base_date);

    series
        .iter()
        .map(|obs| RebasedRow {
            date: obs.date,
            value: obs.value,
            rebased_100: base.and_then(|b| {
                let r = obs.value / b * 100.0;
                r.is_finite().then_some(r)
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{assert_approx, monthly, DEFAULT_EPSILON};

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn first_row_is_the_default_base() {
        let rows = rebase_index(&monthly(2020, &[50.0, 100.0]), None);
        assert_eq!(rows[0].rebased_100, Some(100.0));
        assert_eq!(rows[1].rebased_100, Some(200.0));
    }

    #[test]
    fn explicit_base_date_is_used_when_present() {
        let s = monthly(2020, &[50.0, 100.0, 150.0]);
        let rows = rebase_index(&s, Some(d(2020, 2)));
        assert_approx(rows[0].rebased_100.unwrap(), 50.0, DEFAULT_EPSILON);
        assert_eq!(rows[1].rebased_100, Some(100.0));
        assert_approx(rows[2].rebased_100.unwrap(), 150.0, DEFAULT_EPSILON);
    }

    #[test]
    fn unknown_base_date_falls_back_to_first_row() {
        let s = monthly(2020, &[50.0, 100.0]);
        assert_eq!(rebase_base_value(&s, Some(d(1999, 1))), Some(50.0));
        let rows = rebase_index(&s, Some(d(1999, 1)));
        assert_eq!(rows[0].rebased_100, Some(100.0));
    }

    #[test]
    fn empty_series_rebases_to_nothing() {
        let s = TidySeries::empty();
        assert_eq!(rebase_base_value(&s, None), None);
        assert!(rebase_index(&s, Some(d(2020, 1))).is_empty());
    }

    #[test]
    fn zero_base_yields_missing() {
        let rows = rebase_index(&monthly(2020, &[0.0, 10.0]), None);
        assert!(rows.iter().all(|r| r.rebased_100.is_none()));
    }
}
