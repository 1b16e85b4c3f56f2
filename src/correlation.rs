//! Pairwise correlation over numeric columns.
//!
//! Computes the Pearson coefficient for every pair of numeric columns,
//! dropping rows where either cell is missing (pairwise deletion).
//! Cells where the coefficient is undefined (zero variance, fewer than
//! two surviving pairs) are `None` rather than an error.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::suboptimal_flops)]

use crate::{error::Result, profile::Dtype, table::Table};

/// Square, symmetric correlation matrix over the numeric columns of a
/// table, in table column order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// The numeric column names covered, in table column order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of numeric columns covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the table had no numeric columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The coefficient for a pair of columns, `None` when either name
    /// is unknown or the coefficient is undefined.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Row-major access to the coefficient grid, aligned with
    /// [`CorrelationMatrix::columns`].
    #[must_use]
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }
}

/// Computes the Pearson correlation matrix over the numeric columns.
///
/// Zero or one numeric column yields an empty or trivial matrix, never
/// an error.
///
/// # Errors
///
/// Returns an error only if column extraction fails at the Arrow layer.
pub fn correlation_matrix(table: &Table) -> Result<CorrelationMatrix> {
    let schema = table.schema();

    let mut columns = Vec::new();
    let mut data: Vec<Vec<Option<f64>>> = Vec::new();
    for field in schema.fields() {
        if Dtype::from_arrow(field.data_type()).is_numeric() {
            columns.push(field.name().clone());
            data.push(table.numeric_values(field.name())?);
        }
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        // The diagonal is 1.0 whenever the column has any value at all.
        if data[i].iter().any(|v| v.is_some()) {
            values[i][i] = Some(1.0);
        }

        for j in (i + 1)..n {
            let r = pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix { columns, values })
}

/// Pearson coefficient over pairwise-complete observations, `None`
/// when fewer than two pairs survive or either side has zero variance.
fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
