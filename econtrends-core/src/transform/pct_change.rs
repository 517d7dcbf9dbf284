//! Percentage change over a fixed number of rows.
//!
//! pct[i] = (v[i] - v[i-periods]) / v[i-periods] * 100
//!
//! Lookback is by row position, not by calendar: on monthly data
//! `periods = 12` is year-over-year. The first `periods` rows have no lookback
//! and are missing. A missing operand or a non-finite result (zero base) is
//! missing too.

use crate::domain::{PctChangeRow, TidySeries};

/// Year-over-year lookback on monthly data.
pub const YOY_PERIODS: usize = 12;

/// Percentage change kernel over a column with gaps.
pub fn pct_change_values(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];

    for i in periods..n {
        out[i] = match (values[i - periods], values[i]) {
            (Some(prev), Some(curr)) => {
                let pct = (curr - prev) / prev * 100.0;
                pct.is_finite().then_some(pct)
            }
            _ => None,
        };
    }

    out
}

/// Attach a `pct_change` column to every row of `series`.
pub fn compute_pct_change(series: &TidySeries, periods: usize) -> Vec<PctChangeRow> {
    let values: Vec<Option<f64>> = series.values().map(Some).collect();
    let pct = pct_change_values(&values, periods);

    series
        .iter()
        .zip(pct)
        .map(|(obs, pct_change)| PctChangeRow {
            date: obs.date,
            value: obs.value,
            pct_change,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{assert_approx, monthly, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    #[test]
    fn basic_one_period() {
        // 100 -> 110 -> 121: +10% each step
        let s = monthly(2020, &[100.0, 110.0, 121.0]);
        let rows = compute_pct_change(&s, 1);
        assert!(rows[0].pct_change.is_none());
        assert_approx(rows[1].pct_change.unwrap(), 10.0, DEFAULT_EPSILON);
        assert_approx(rows[2].pct_change.unwrap(), 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn year_over_year_on_sparse_rows_uses_row_lookback() {
        // Two rows a year apart; with periods=1 the second row compares to the first.
        let s = TidySeries::from_pairs([
            (NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 60.0),
            (NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), 90.0),
        ]);
        let rows = compute_pct_change(&s, 1);
        assert!(rows[0].pct_change.is_none());
        assert_approx(rows[1].pct_change.unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn twelve_month_lookback() {
        let mut values = vec![60.0; 12];
        values.push(90.0);
        let rows = compute_pct_change(&monthly(2020, &values), YOY_PERIODS);
        assert!(rows[..12].iter().all(|r| r.pct_change.is_none()));
        assert_eq!(rows[12].date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_approx(rows[12].pct_change.unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn periods_longer_than_series_is_all_missing() {
        let rows = compute_pct_change(&monthly(2020, &[1.0, 2.0, 3.0]), 12);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.pct_change.is_none()));
    }

    #[test]
    fn zero_base_is_missing() {
        let rows = compute_pct_change(&monthly(2020, &[0.0, 5.0]), 1);
        assert!(rows[1].pct_change.is_none());
    }

    #[test]
    fn kernel_propagates_gaps() {
        let out = pct_change_values(&[Some(100.0), None, Some(120.0), Some(150.0)], 1);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
        assert_approx(out[3].unwrap(), 25.0, DEFAULT_EPSILON);
    }

    #[test]
    fn input_is_untouched() {
        let s = monthly(2020, &[1.0, 2.0]);
        let before = s.clone();
        let _ = compute_pct_change(&s, 1);
        assert_eq!(s, before);
    }
}
