//! Column-oriented table of nullable numeric columns over a dated index.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::indicator::{ColumnId, Values};

/// A dated table keyed by [`ColumnId`]. Columns iterate in canonical order.
///
/// `positions[r]` is the index, in the bar series the frame was computed from,
/// of row `r`; row filtering keeps it so callers can always find the source bar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    positions: Vec<usize>,
    columns: BTreeMap<ColumnId, Values>,
}

impl Frame {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        let positions = (0..dates.len()).collect();
        Self {
            dates,
            positions,
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Add or replace a column. Columns shorter or longer than the index are
    /// padded with `None` or truncated.
    pub fn insert(&mut self, id: ColumnId, mut values: Values) {
        values.resize(self.len(), None);
        self.columns.insert(id, values);
    }

    /// Add a column holding the same value on every row.
    pub fn broadcast(&mut self, id: ColumnId, value: Option<f64>) {
        self.columns.insert(id, vec![value; self.len()]);
    }

    pub fn column(&self, id: ColumnId) -> Option<&Values> {
        self.columns.get(&id)
    }

    pub fn has_column(&self, id: ColumnId) -> bool {
        self.columns.contains_key(&id)
    }

    pub fn value(&self, id: ColumnId, row: usize) -> Option<f64> {
        self.columns.get(&id)?.get(row).copied().flatten()
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = (ColumnId, &Values)> + '_ {
        self.columns.iter().map(|(id, v)| (*id, v))
    }

    /// `(column, value)` pairs of one row in canonical column order.
    pub fn row(&self, row: usize) -> Vec<(ColumnId, Option<f64>)> {
        self.columns
            .iter()
            .map(|(id, v)| (*id, v.get(row).copied().flatten()))
            .collect()
    }

    /// Fraction of columns undefined on `row` (0 for a frame without columns).
    pub fn undefined_fraction(&self, row: usize) -> f64 {
        if self.columns.is_empty() {
            return 0.0;
        }
        let missing = self
            .columns
            .values()
            .filter(|v| v.get(row).copied().flatten().is_none())
            .count();
        missing as f64 / self.columns.len() as f64
    }

    /// Keep the rows for which `keep(row)` holds, preserving order.
    pub fn filter_rows<F>(&self, keep: F) -> Frame
    where
        F: Fn(usize) -> bool,
    {
        let rows: Vec<usize> = (0..self.len()).filter(|&r| keep(r)).collect();
        self.select(&rows)
    }

    /// The last `n` rows (all rows when `n >= len`).
    pub fn tail(&self, n: usize) -> Frame {
        let start = self.len().saturating_sub(n);
        let rows: Vec<usize> = (start..self.len()).collect();
        self.select(&rows)
    }

    fn select(&self, rows: &[usize]) -> Frame {
        Frame {
            dates: rows.iter().map(|&r| self.dates[r]).collect(),
            positions: rows.iter().map(|&r| self.positions[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(id, v)| (*id, rows.iter().map(|&r| v[r]).collect()))
                .collect(),
        }
    }
}
