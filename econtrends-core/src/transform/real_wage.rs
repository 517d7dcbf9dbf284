//! Real wage: a nominal wage series deflated by a price index.
//!
//! 1. Nearest-date join of wage rows to price-index rows (ties → earlier date)
//! 2. Base = price-index value on the first joined row
//! 3. real_wage = nominal / (price / base)
//! 4. real_wage_yoy = 12-row percentage change of real_wage

use super::join::{nearest_join, NearestMatch};
use super::pct_change::{pct_change_values, YOY_PERIODS};
use crate::domain::{RealWageRow, TidySeries};

/// Base-value policy for the deflator: the price reading matched to the
/// earliest wage row. `None` when there are no rows or that row is unmatched.
pub fn price_index_base(joined: &[NearestMatch]) -> Option<f64> {
    joined.first().and_then(|m| m.right)
}

/// Deflate `nominal` by `price_index`.
///
/// Output has one row per nominal row. An empty nominal series returns an
/// empty table without resolving a base.
pub fn compute_real_wage(nominal: &TidySeries, price_index: &TidySeries) -> Vec<RealWageRow> {
    let joined = nearest_join(nominal, price_index);
    if joined.is_empty() {
        return Vec::new();
    }

    let base = price_index_base(&joined);
    let real: Vec<Option<f64>> = joined
        .iter()
        .map(|m| deflate(m.left, m.right, base))
        .collect();
    let yoy = pct_change_values(&real, YOY_PERIODS);

    joined
        .iter()
        .zip(real)
        .zip(yoy)
        .map(|((m, real_wage), real_wage_yoy)| RealWageRow {
            date: m.date,
            value_ripte: m.left,
            value_ipc: m.right,
            real_wage,
            real_wage_yoy,
        })
        .collect()
}

fn deflate(nominal: f64, price: Option<f64>, base: Option<f64>) -> Option<f64> {
    let (price, base) = (price?, base?);
    let real = nominal / (price / base);
    real.is_finite().then_some(real)
}
