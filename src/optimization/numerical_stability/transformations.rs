//! Numerical stability utilities for probability tables.
//!
//! Provides the small set of guarded operations the observer model applies to
//! probability columns: fixed-precision rounding, flooring of non-positive
//! cells, and per-column renormalization.
//!
//! # Provided items
//! - [`POSTERIOR_PRECISION`]: rounding grid for posteriors (default 1e-6).
//! - [`PROBABILITY_FLOOR`]: strictly positive replacement for cells `<= 0`.
//! - [`COLUMN_SUM_TOL`]: absolute tolerance when checking that a column sums to 1.
//! - [`round_to_precision`]: snap a value onto a decimal grid.
//! - [`floor_non_positive`]: replace non-positive cells with a floor.
//! - [`normalize_columns`]: divide every column by its sum.
//! - [`safe_softplus`] / [`safe_softplus_inv`]: map between ℝ and `(0, ∞)`
//!   so concentrations can be searched without a sign constraint.
//!
//! # Rationale
//! Posterior modes are found by exact equality against the column maximum,
//! which only works once round-off noise is removed. Circular convolution via
//! FFT leaves cells of order `-1e-18`; a floor keeps `ln p` finite while still
//! charging a heavy penalty (`-ln(1e-319) ≈ 734.5`).
use ndarray::{Array2, Axis};

/// Decimal grid posteriors are snapped to before mode finding.
///
/// Too coarse and spurious modes appear next to the true one; too fine and
/// genuine ties are split by round-off. `1e-6` matches the reference fits.
pub const POSTERIOR_PRECISION: f64 = 1e-6;

/// Value substituted for predicted probabilities that are `<= 0`.
///
/// This is a subnormal `f64` (`10e-320`), the smallest positive value the
/// original fitting pipeline used.
pub const PROBABILITY_FLOOR: f64 = 1e-319;

/// Absolute tolerance for "column sums to one" checks.
pub const COLUMN_SUM_TOL: f64 = 1e-9;

/// Round `x` to the nearest multiple of `precision`.
///
/// NaN propagates unchanged, which lets degenerate posterior columns be
/// detected after rounding.
#[inline]
pub fn round_to_precision(x: f64, precision: f64) -> f64 {
    (x / precision).round() * precision
}

/// Replace every cell `<= 0` with `floor` and return how many were replaced.
pub fn floor_non_positive(table: &mut Array2<f64>, floor: f64) -> usize {
    let mut n_floored = 0;
    table.mapv_inplace(|p| {
        if p <= 0.0 {
            n_floored += 1;
            floor
        } else {
            p
        }
    });
    n_floored
}

/// Divide each column by its sum.
///
/// A column that sums to zero becomes NaN, mirroring `0 / 0`. Callers that
/// rely on this (degenerate posteriors) inspect the result afterwards.
pub fn normalize_columns(table: &mut Array2<f64>) {
    let sums = table.sum_axis(Axis(0));
    for (mut col, &s) in table.axis_iter_mut(Axis(1)).zip(sums.iter()) {
        col.mapv_inplace(|p| p / s);
    }
}

/// Numerically stable softplus, `ln(1 + exp(x))`, mapping ℝ onto `(0, ∞)`.
///
/// Large inputs return `x` directly to avoid overflow; very negative inputs
/// underflow to `0`, which the von Mises density treats as uniform. NaN
/// propagates.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Inverse of [`safe_softplus`] on `(0, ∞)`: `ln(exp(x) - 1)`.
///
/// `x` must be finite and `> 0`; zero maps to `-inf` and negatives to NaN.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}
