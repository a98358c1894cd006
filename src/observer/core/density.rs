//! CircularDensity — discretized von Mises densities on the circle.
//!
//! Purpose
//! -------
//! Evaluate normalized von Mises probabilities at a set of evaluation points
//! for every combination of location and concentration, returning a matrix so
//! downstream code can broadcast uniformly.
//!
//! Key behaviors
//! -------------
//! - Rows are evaluation points `x`; columns enumerate `(k, u)` pairs with the
//!   location varying fastest: `col = k_idx * u.len() + u_idx`.
//! - Each column is proportional to `exp(k·(cos(x − u) − 1))` and normalized to
//!   sum to one over `x`. Shifting the exponent by `-k` keeps the peak at 1 and
//!   avoids overflow for large `k`.
//! - `k = 0` yields the exact uniform `1 / x.len()` with no division by a
//!   computed sum.
//! - `k = +inf` (or a finite `k` so large every weight underflows) yields a
//!   point mass at the evaluation point circularly closest to `u`; ties go to
//!   the first such point.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x` and `u` are in degrees; differences are taken before converting to
//!   radians so wrap-around is exact.
//! - Negative or NaN concentrations are rejected with
//!   `ObserverError::InvalidConcentration`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover normalization, the uniform and point-mass limits, the
//!   column layout, and rejection of invalid concentrations.
use ndarray::{Array1, Array2};

use crate::observer::{
    core::space::{CircularSpace, deg_to_rad},
    errors::{ObserverError, ObserverResult},
};

/// Reject negative or NaN concentrations.
pub fn validate_concentration(name: &'static str, k: f64) -> ObserverResult<()> {
    if k.is_nan() || k < 0.0 {
        return Err(ObserverError::InvalidConcentration { name, value: k });
    }
    Ok(())
}

/// Von Mises probabilities over `x` for every `(k, u)` pair.
///
/// # Errors
/// - `ObserverError::InvalidConcentration` if any `k` is negative or NaN.
pub fn von_mises(x: &[f64], u: &[f64], k: &[f64]) -> ObserverResult<Array2<f64>> {
    for &ki in k {
        validate_concentration("k", ki)?;
    }
    let n_u = u.len();
    let mut out = Array2::<f64>::zeros((x.len(), n_u * k.len()));
    for (ki, &kappa) in k.iter().enumerate() {
        for (ui, &mu) in u.iter().enumerate() {
            let mut col = out.column_mut(ki * n_u + ui);
            col.assign(&column(x, mu, kappa));
        }
    }
    Ok(out)
}

/// Single normalized column for one location and a validated concentration.
pub(crate) fn column(x: &[f64], mu: f64, kappa: f64) -> Array1<f64> {
    let n = x.len();
    if n == 0 {
        return Array1::zeros(0);
    }
    if kappa == 0.0 {
        return Array1::from_elem(n, 1.0 / n as f64);
    }
    if kappa.is_finite() {
        let w: Array1<f64> =
            x.iter().map(|&xi| (kappa * (deg_to_rad(xi - mu).cos() - 1.0)).exp()).collect();
        let total = w.sum();
        if total > 0.0 && total.is_finite() {
            return w / total;
        }
    }
    point_mass(x, mu)
}

/// Unit mass at the evaluation point nearest to `mu` on the circle.
pub(crate) fn point_mass(x: &[f64], mu: f64) -> Array1<f64> {
    let mut out = Array1::zeros(x.len());
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, &xi) in x.iter().enumerate() {
        let d = CircularSpace::distance(xi, mu);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    if !x.is_empty() {
        out[best] = 1.0;
    }
    out
}
