//! Missing-value analysis.
//!
//! Counts missing (null) cells per column and reports each column's
//! missing share. Independent of the structural summary; both consume
//! the same table.

#![allow(clippy::cast_precision_loss)]

use crate::{error::Result, table::Table};

/// Missing-value statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingEntry {
    /// Column name.
    pub name: String,
    /// Number of missing cells, at most the table row count.
    pub missing_count: usize,
    /// `missing_count / n_rows`, in `[0, 1]`.
    ///
    /// Reported as `0.0` for a zero-row table rather than dividing by
    /// zero. This is a deliberate degenerate-input policy, not a
    /// derived value.
    pub missing_share: f64,
}

/// Per-column missing-value report, entries in table column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingReport {
    entries: Vec<MissingEntry>,
}

impl MissingReport {
    /// Look up an entry by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MissingEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Iterate over entries in table column order.
    pub fn iter(&self) -> impl Iterator<Item = &MissingEntry> {
        self.entries.iter()
    }

    /// Number of columns covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the report covers no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The largest missing share across all columns, `0.0` when the
    /// report covers no columns.
    #[must_use]
    pub fn max_missing_share(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.missing_share)
            .fold(0.0, f64::max)
    }
}

/// Computes the per-column missing-value report.
///
/// # Errors
///
/// Returns an error only if column extraction fails at the Arrow layer.
pub fn missing_table(table: &Table) -> Result<MissingReport> {
    let n_rows = table.n_rows();
    let mut entries = Vec::with_capacity(table.n_cols());

    for name in table.column_names() {
        let values = table.string_values(name)?;
        let missing_count = values.iter().filter(|v| v.is_none()).count();
        let missing_share = if n_rows == 0 {
            0.0
        } else {
            missing_count as f64 / n_rows as f64
        };

        entries.push(MissingEntry {
            name: name.to_string(),
            missing_count,
            missing_share,
        });
    }

    Ok(MissingReport { entries })
}
