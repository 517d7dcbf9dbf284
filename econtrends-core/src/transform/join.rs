//! Nearest-date join between two sorted series.
//!
//! Every left date is paired with the right observation whose date is closest.
//! When two right dates are equally distant, the earlier one wins. An empty
//! right side leaves every left row unmatched.

use crate::domain::{Observation, TidySeries};
use chrono::NaiveDate;

/// A left observation and its nearest right-hand value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    pub date: NaiveDate,
    pub left: f64,
    pub right: Option<f64>,
    /// Date of the matched right observation.
    pub right_date: Option<NaiveDate>,
}

/// Join `left` to `right` by nearest date. Output has one row per left row.
pub fn nearest_join(left: &TidySeries, right: &TidySeries) -> Vec<NearestMatch> {
    let rows = right.observations();

    left.iter()
        .map(|obs| {
            let matched = nearest(rows, obs.date);
            NearestMatch {
                date: obs.date,
                left: obs.value,
                right: matched.map(|m| m.value),
                right_date: matched.map(|m| m.date),
            }
        })
        .collect()
}

/// Closest observation to `date` in ascending `rows`; ties go to the earlier row.
fn nearest(rows: &[Observation], date: NaiveDate) -> Option<&Observation> {
    // First index with rows[idx].date >= date.
    let idx = rows.partition_point(|o| o.date < date);
    let before = idx.checked_sub(1).and_then(|i| rows.get(i));
    let after = rows.get(idx);

    match (before, after) {
        (Some(b), Some(a)) => {
            let back = (date - b.date).num_days();
            let fwd = (a.date - date).num_days();
            if back <= fwd {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some(b), None) => Some(b),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(rows: &[(&str, f64)]) -> TidySeries {
        TidySeries::from_pairs(rows.iter().map(|(s, v)| (d(s), *v)))
    }

    #[test]
    fn exact_dates_match_exactly() {
        let left = series(&[("2020-01-01", 1.0), ("2020-02-01", 2.0)]);
        let right = series(&[("2020-01-01", 10.0), ("2020-02-01", 20.0)]);
        let out = nearest_join(&left, &right);
        assert_eq!(out[0].right, Some(10.0));
        assert_eq!(out[1].right, Some(20.0));
    }

    #[test]
    fn picks_closest_date_in_either_direction() {
        let right = series(&[("2020-01-01", 10.0), ("2020-02-01", 20.0)]);
        let left = series(&[
            ("2019-12-01", 1.0), // before everything -> first
            ("2020-01-10", 2.0), // 9 days after Jan 1
            ("2020-01-25", 3.0), // 7 days before Feb 1
            ("2020-06-01", 4.0), // after everything -> last
        ]);
        let out = nearest_join(&left, &right);
        let matched: Vec<_> = out.iter().map(|m| m.right).collect();
        assert_eq!(matched, vec![Some(10.0), Some(10.0), Some(20.0), Some(20.0)]);
        assert_eq!(out[2].right_date, Some(d("2020-02-01")));
    }

    #[test]
    fn ties_prefer_the_earlier_date() {
        let right = series(&[("2020-01-01", 10.0), ("2020-01-11", 20.0)]);
        let left = series(&[("2020-01-06", 1.0)]);
        let out = nearest_join(&left, &right);
        assert_eq!(out[0].right, Some(10.0));
        assert_eq!(out[0].right_date, Some(d("2020-01-01")));
    }

    #[test]
    fn empty_right_leaves_rows_unmatched() {
        let left = series(&[("2020-01-01", 1.0)]);
        let out = nearest_join(&left, &TidySeries::empty());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].right, None);
        assert_eq!(out[0].right_date, None);
    }

    #[test]
    fn empty_left_is_empty() {
        let right = series(&[("2020-01-01", 1.0)]);
        assert!(nearest_join(&TidySeries::empty(), &right).is_empty());
    }
}
