//! Wide summary table keyed by date.
//!
//! Built by repeated joins of named columns:
//! - `outer_join` adds a column and any dates it brings
//! - `left_join` adds a column only on dates already present
//!
//! Rows are always ascending by date, one row per date. A column that has no
//! value on a date holds `None`; nothing is defaulted or filled.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("summary already has a column named '{0}'")]
    DuplicateColumn(String),
}

/// One summary row; `values` lines up with [`SummaryTable::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl SummaryTable {
    /// Start a table from a single column; its dates become the initial rows.
    pub fn from_column<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let rows = collect_points(points)
            .into_iter()
            .map(|(date, v)| (date, vec![v]))
            .collect();
        Self {
            columns: vec![name.into()],
            rows,
        }
    }

    /// Add a column, creating rows for dates not yet present.
    pub fn outer_join<I>(mut self, name: impl Into<String>, points: I) -> Result<Self, SummaryError>
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let name = self.check_new_column(name.into())?;
        let mut incoming = collect_points(points);
        let width = self.columns.len();

        for (date, values) in self.rows.iter_mut() {
            values.push(incoming.remove(date).flatten());
        }
        for (date, v) in incoming {
            let mut values = vec![None; width];
            values.push(v);
            self.rows.insert(date, values);
        }

        self.columns.push(name);
        Ok(self)
    }

    /// Add a column on existing dates only; other incoming dates are ignored.
    pub fn left_join<I>(mut self, name: impl Into<String>, points: I) -> Result<Self, SummaryError>
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let name = self.check_new_column(name.into())?;
        let incoming = collect_points(points);

        for (date, values) in self.rows.iter_mut() {
            values.push(incoming.get(date).copied().flatten());
        }

        self.columns.push(name);
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.keys().copied().collect()
    }

    /// Rows in ascending date order.
    pub fn rows(&self) -> impl Iterator<Item = SummaryRow> + '_ {
        self.rows.iter().map(|(date, values)| SummaryRow {
            date: *date,
            values: values.clone(),
        })
    }

    /// A whole column, aligned with [`SummaryTable::dates`].
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.values().map(|v| v[idx]).collect())
    }

    /// A single cell; `None` for unknown dates/columns or a missing value.
    pub fn get(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(&date).and_then(|v| v[idx])
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn check_new_column(&self, name: String) -> Result<String, SummaryError> {
        if self.column_index(&name).is_some() {
            return Err(SummaryError::DuplicateColumn(name));
        }
        Ok(name)
    }
}

/// Points keyed by date; the first point for a date wins.
fn collect_points<I>(points: I) -> BTreeMap<NaiveDate, Option<f64>>
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    let mut map = BTreeMap::new();
    for (date, v) in points {
        map.entry(date).or_insert(v);
    }
    map
}
