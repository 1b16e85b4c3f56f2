//! Structural profiling of tables.
//!
//! Produces a [`DatasetSummary`] with one [`ColumnSummary`] per column:
//! semantic type, missing and distinct counts, numeric range and mean,
//! and the most frequent value of categorical columns. The summary is
//! the input to the quality heuristics and can be flattened into a
//! row-per-column RecordBatch for display.

// Statistical computation over row counts
#![allow(clippy::cast_precision_loss)]

use std::{collections::HashMap, fmt, sync::Arc};

use arrow::{
    array::{Float64Array, RecordBatch, StringArray, UInt64Array},
    datatypes::{DataType, Field, Schema},
};

use crate::{
    error::Result,
    table::Table,
};

/// Semantic type of a column, decided once per column during profiling
/// and carried thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// Integer, unsigned, floating point or decimal values.
    Numeric,
    /// Text or boolean values.
    Categorical,
    /// Anything else (timestamps, nested types, binary). Never an
    /// error; such columns still get missing and distinct counts.
    Other,
}

impl Dtype {
    /// Classify an Arrow data type.
    #[must_use]
    pub fn from_arrow(data_type: &DataType) -> Self {
        if data_type.is_numeric() {
            Self::Numeric
        } else {
            match data_type {
                DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Boolean => {
                    Self::Categorical
                }
                _ => Self::Other,
            }
        }
    }

    /// Check if this is the numeric variant.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }

    /// Check if this is the categorical variant.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Range statistics for a numeric column, computed over non-missing
/// values. Absent when every value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

/// Structural statistics for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Semantic type.
    pub dtype: Dtype,
    /// Number of missing (null) cells.
    pub missing_count: usize,
    /// Number of distinct non-missing values.
    pub distinct_count: usize,
    /// Min/max/mean for numeric columns with at least one value.
    pub numeric: Option<NumericSummary>,
    /// Most frequent value of a categorical column, ties broken by
    /// first-seen order. Absent for other dtypes or all-missing data.
    pub top_value: Option<String>,
}

impl ColumnSummary {
    /// Check if the column holds at most one distinct non-missing
    /// value. A fully-missing column is constant by this definition.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.distinct_count <= 1
    }
}

/// Dataset-level summary: shape plus per-column statistics in table
/// column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// Number of rows in the source table.
    pub n_rows: usize,
    /// Number of columns in the source table.
    pub n_cols: usize,
    /// One entry per column, order matching the table.
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    /// Look up a column summary by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Computes the structural summary of a table.
///
/// Works on any rectangular table, including zero rows or zero columns;
/// degenerate shapes produce empty statistics rather than errors.
///
/// # Errors
///
/// Returns an error only if column extraction fails at the Arrow layer.
pub fn summarize_dataset(table: &Table) -> Result<DatasetSummary> {
    let schema = table.schema();
    let mut columns = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let name = field.name();
        let dtype = Dtype::from_arrow(field.data_type());
        let values = table.string_values(name)?;

        let missing_count = values.iter().filter(|v| v.is_none()).count();
        let distinct_count = distinct_count(&values);

        let numeric = if dtype.is_numeric() {
            numeric_summary(&table.numeric_values(name)?)
        } else {
            None
        };

        let top_value = if dtype.is_categorical() {
            most_frequent(&values)
        } else {
            None
        };

        columns.push(ColumnSummary {
            name: name.clone(),
            dtype,
            missing_count,
            distinct_count,
            numeric,
            top_value,
        });
    }

    Ok(DatasetSummary {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        columns,
    })
}

/// Flattens a [`DatasetSummary`] into a row-per-column RecordBatch.
///
/// Pure transform for display: no statistic is recomputed beyond the
/// per-column `missing_share` ratio (0.0 when the table has no rows).
/// Output columns: `name`, `dtype`, `missing_count`, `missing_share`,
/// `distinct_count`, `min`, `max`, `mean`, `top_value`.
///
/// # Errors
///
/// Returns an error only if batch assembly fails at the Arrow layer.
pub fn flatten_summary_for_print(summary: &DatasetSummary) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("dtype", DataType::Utf8, false),
        Field::new("missing_count", DataType::UInt64, false),
        Field::new("missing_share", DataType::Float64, false),
        Field::new("distinct_count", DataType::UInt64, false),
        Field::new("min", DataType::Float64, true),
        Field::new("max", DataType::Float64, true),
        Field::new("mean", DataType::Float64, true),
        Field::new("top_value", DataType::Utf8, true),
    ]));

    let names: StringArray = summary.columns.iter().map(|c| Some(c.name.as_str())).collect();
    let dtypes: StringArray = summary
        .columns
        .iter()
        .map(|c| Some(c.dtype.to_string()))
        .collect();
    let missing_counts: UInt64Array = summary
        .columns
        .iter()
        .map(|c| Some(c.missing_count as u64))
        .collect();
    let missing_shares: Float64Array = summary
        .columns
        .iter()
        .map(|c| {
            if summary.n_rows == 0 {
                Some(0.0)
            } else {
                Some(c.missing_count as f64 / summary.n_rows as f64)
            }
        })
        .collect();
    let distinct_counts: UInt64Array = summary
        .columns
        .iter()
        .map(|c| Some(c.distinct_count as u64))
        .collect();
    let mins: Float64Array = summary
        .columns
        .iter()
        .map(|c| c.numeric.as_ref().map(|n| n.min))
        .collect();
    let maxs: Float64Array = summary
        .columns
        .iter()
        .map(|c| c.numeric.as_ref().map(|n| n.max))
        .collect();
    let means: Float64Array = summary
        .columns
        .iter()
        .map(|c| c.numeric.as_ref().map(|n| n.mean))
        .collect();
    let top_values: StringArray = summary
        .columns
        .iter()
        .map(|c| c.top_value.as_deref())
        .collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(names),
            Arc::new(dtypes),
            Arc::new(missing_counts),
            Arc::new(missing_shares),
            Arc::new(distinct_counts),
            Arc::new(mins),
            Arc::new(maxs),
            Arc::new(means),
            Arc::new(top_values),
        ],
    )?;

    Ok(batch)
}

/// Count distinct non-missing values.
fn distinct_count(values: &[Option<String>]) -> usize {
    let mut seen = std::collections::HashSet::new();
    for value in values.iter().flatten() {
        seen.insert(value.as_str());
    }
    seen.len()
}

/// Min/max/mean over non-missing cells, `None` when no value survives.
fn numeric_summary(values: &[Option<f64>]) -> Option<NumericSummary> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for v in &present {
        min = min.min(*v);
        max = max.max(*v);
        sum += v;
    }

    Some(NumericSummary {
        min,
        max,
        mean: sum / present.len() as f64,
    })
}

/// Most frequent non-missing value, ties broken by first-seen order.
fn most_frequent(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (index, value) in values.iter().enumerate() {
        if let Some(value) = value {
            let entry = counts.entry(value.as_str()).or_insert((0, index));
            entry.0 += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(value, _)| value.to_string())
}
