//! Tidy series and the derived indicator rows built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, value) observation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A validated two-column (date, value) table.
///
/// Invariants, enforced at construction:
/// - rows sorted ascending by date
/// - no duplicate dates (the first row seen for a date wins)
/// - every value is finite
///
/// There is no mutable access to the rows; transforms build new tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidySeries {
    rows: Vec<Observation>,
}

impl TidySeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from arbitrary observations, enforcing the invariants.
    pub fn from_observations(rows: Vec<Observation>) -> Self {
        Self::from_observations_counted(rows).0
    }

    /// Like [`TidySeries::from_observations`], also returning how many rows were
    /// discarded as duplicate dates or non-finite values.
    pub fn from_observations_counted(mut rows: Vec<Observation>) -> (Self, usize) {
        let before = rows.len();
        rows.retain(|o| o.value.is_finite());
        // Stable sort keeps upstream order among equal dates, so dedup keeps the first.
        rows.sort_by_key(|o| o.date);
        rows.dedup_by_key(|o| o.date);
        let discarded = before - rows.len();
        (Self { rows }, discarded)
    }

    /// Convenience constructor from `(date, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::from_observations(
            pairs
                .into_iter()
                .map(|(date, value)| Observation { date, value })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.rows.last()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|o| o.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|o| o.value)
    }

    /// Value at an exact date (binary search over the sorted rows).
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.rows
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|i| self.rows[i].value)
    }
}

impl<'a> IntoIterator for &'a TidySeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Row of a percentage-change table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PctChangeRow {
    pub date: NaiveDate,
    pub value: f64,
    pub pct_change: Option<f64>,
}

/// Row of a rebased (base = 100) table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebasedRow {
    pub date: NaiveDate,
    pub value: f64,
    pub rebased_100: Option<f64>,
}

/// Row of the real-wage table: a nominal wage matched to its nearest price-index reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealWageRow {
    pub date: NaiveDate,
    pub value_ripte: f64,
    pub value_ipc: Option<f64>,
    pub real_wage: Option<f64>,
    pub real_wage_yoy: Option<f64>,
}
