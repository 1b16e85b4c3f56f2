//! Top-value tables for categorical columns.
//!
//! For up to `max_columns` categorical columns (in table column order)
//! counts the occurrences of each distinct non-missing value and keeps
//! the `top_k` most frequent, ties broken by first-seen order.

use std::collections::HashMap;

use crate::{error::Result, profile::Dtype, table::Table};

/// One value of a categorical column with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    /// The cell value.
    pub value: String,
    /// Number of occurrences.
    pub count: usize,
}

/// The most frequent values of one categorical column, count
/// descending, at most `top_k` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopValues {
    /// Column name.
    pub name: String,
    /// Value/count rows, count descending, ties in first-seen order.
    pub values: Vec<ValueCount>,
}

/// Top-value tables for the selected categorical columns, in table
/// column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopCategories {
    entries: Vec<TopValues>,
}

impl TopCategories {
    /// Look up the top values of a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TopValues> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Iterate over covered columns in table column order.
    pub fn iter(&self) -> impl Iterator<Item = &TopValues> {
        self.entries.iter()
    }

    /// Number of covered columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no categorical column was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes top-value tables for up to `max_columns` categorical
/// columns, keeping `top_k` rows per column.
///
/// Column selection is deterministic: categorical dtype, table column
/// order, truncated at `max_columns`. Missing cells are never counted.
///
/// # Errors
///
/// Returns an error only if column extraction fails at the Arrow layer.
pub fn top_categories(table: &Table, max_columns: usize, top_k: usize) -> Result<TopCategories> {
    let schema = table.schema();
    let mut entries = Vec::new();

    for field in schema.fields() {
        if entries.len() >= max_columns {
            break;
        }
        if !Dtype::from_arrow(field.data_type()).is_categorical() {
            continue;
        }

        let values = table.string_values(field.name())?;
        entries.push(TopValues {
            name: field.name().clone(),
            values: count_top_values(&values, top_k),
        });
    }

    Ok(TopCategories { entries })
}

/// Count non-missing values and keep the `top_k` most frequent, ties
/// broken by first-seen order.
fn count_top_values(values: &[Option<String>], top_k: usize) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (index, value) in values.iter().enumerate() {
        if let Some(value) = value {
            let entry = counts.entry(value.as_str()).or_insert((0, index));
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first_seen))| (value, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(top_k);

    ranked
        .into_iter()
        .map(|(value, count, _)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect()
}
