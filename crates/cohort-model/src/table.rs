//! In-memory tabular batch read from a template-shaped CSV file.
//!
//! Cells are kept as strings so values like zero-padded identifiers
//! survive untouched. A cell is `None` when the source field was empty
//! (a true null); a whitespace-only field becomes `Some("")`, which the
//! validators reject as a blank string — blanks indicate bad null
//! encoding upstream and must not silently become nulls.

use std::collections::BTreeSet;

/// A loaded tabular batch: ordered headers plus string-typed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table from headers and rows. Short rows are padded with
    /// nulls to the header width; long rows are truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Cell value at (row, column); `None` for a null cell or an unknown
    /// column. A blank (whitespace-only) cell is `Some("")`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Lazy sequence of row views, in file order. Finite; restart by
    /// calling again on the same table.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows.len()).map(move |index| RowView { table: self, index })
    }

    /// True when two rows are equal across every column.
    pub fn has_duplicate_rows(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.rows.iter().any(|row| !seen.insert(row))
    }

    /// First blank-string cell, as (row, column name), if any.
    pub fn find_blank_cell(&self) -> Option<(usize, &str)> {
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if let Some(value) = cell
                    && value.trim().is_empty()
                {
                    return Some((row_idx, self.headers[col_idx].as_str()));
                }
            }
        }
        None
    }

    /// Distinct non-null values of a column, in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Vec<&str> {
        let Some(col) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        let mut distinct = Vec::new();
        for row in &self.rows {
            if let Some(value) = row[col].as_deref()
                && seen.insert(value)
            {
                distinct.push(value);
            }
        }
        distinct
    }
}

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowView<'a> {
    /// Zero-based row number within the batch.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Named cell of this row; `None` when null or the column is unknown.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.cell(self.index, column)
    }
}
