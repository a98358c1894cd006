//! Shared validation helpers for dataset columns and probability tables.
use ndarray::{Array2, Axis};

use crate::{
    observer::errors::{ObserverError, ObserverResult},
    optimization::numerical_stability::COLUMN_SUM_TOL,
};

/// Ensure a dataset column has the expected number of trials.
pub fn check_len(column: &'static str, expected: usize, actual: usize) -> ObserverResult<()> {
    if expected != actual {
        return Err(ObserverError::ColumnLengthMismatch { column, expected, actual });
    }
    Ok(())
}

/// Ensure every cell of a numeric column is finite.
pub fn check_finite(column: &'static str, values: &[f64]) -> ObserverResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(ObserverError::NonFiniteData { column, index, value });
        }
    }
    Ok(())
}

/// Ensure every column of `table` sums to one within [`COLUMN_SUM_TOL`].
///
/// NaN sums fail the check.
pub fn check_column_sums(stage: &'static str, table: &Array2<f64>) -> ObserverResult<()> {
    for (column, sum) in table.sum_axis(Axis(0)).iter().enumerate() {
        if sum.is_nan() || (sum - 1.0).abs() > COLUMN_SUM_TOL {
            return Err(ObserverError::ColumnSumViolation { stage, column, sum: *sum });
        }
    }
    Ok(())
}

/// Sorted unique values of a finite column.
///
/// `descending` selects the order used for noise levels.
pub fn unique_sorted(values: &[f64], descending: bool) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    if descending {
        out.reverse();
    }
    out
}
