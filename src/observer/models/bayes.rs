//! BayesCombiner — posterior over stimuli for every possible measurement.
//!
//! Purpose
//! -------
//! Combine the sensory likelihood `L(s | m)` with the learned prior `π(s)`
//! into `posterior(s | m) ∝ L(s | m) · π(s)`, normalized per measurement
//! column, and snap the result to a decimal grid so MAP ties are exact.
//!
//! Key behaviors
//! -------------
//! - Inputs and output are `(stimulus × measurement)` matrices on the
//!   circular domain.
//! - After normalization every cell is rounded to `precision` (default
//!   `1e-6`). Rounding too coarsely invents modes next to the true one;
//!   rounding too finely lets float noise split genuine ties.
//! - Columns whose product underflows everywhere become NaN. For
//!   `k_llh = k_prior = +inf` they are rebuilt from the closed-form
//!   combination of two von Mises densities:
//!   `u' = m + atan2(sin(u_p − m), k_ratio + cos(u_p − m))` with
//!   `k_ratio = 1`, rounded to the nearest degree, and concentration
//!   `k' = +inf`, i.e. a point mass at `u'`.
//! - Any other concentration pair that produces NaN columns fails with
//!   `ObserverError::DegeneratePosterior`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `llh` and `prior` have identical shapes; `measurements[j]` is the degree
//!   of column `j`.
//! - Non-degenerate columns sum to one up to the rounding grid.
use ndarray::{Array2, Axis, Zip};

use crate::{
    observer::{
        core::{
            density::point_mass,
            space::{CircularSpace, deg_to_rad, rad_to_deg},
        },
        errors::{ObserverError, ObserverResult},
    },
    optimization::numerical_stability::{normalize_columns, round_to_precision},
};

/// Bayesian combination with posterior rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesCombiner {
    pub precision: f64,
}

impl BayesCombiner {
    pub fn new(precision: f64) -> ObserverResult<Self> {
        if !precision.is_finite() || precision <= 0.0 {
            return Err(ObserverError::InvalidPrecision { value: precision });
        }
        Ok(Self { precision })
    }

    /// Posterior `(stimulus × measurement)` matrix.
    ///
    /// # Errors
    /// - `ObserverError::DegeneratePosterior` when NaN columns appear and the
    ///   concentrations are not both infinite.
    pub fn combine(
        &self, llh: &Array2<f64>, prior: &Array2<f64>, k_llh: f64, k_prior: f64, prior_mode: f64,
        measurements: &[f64],
    ) -> ObserverResult<Array2<f64>> {
        let mut posterior = llh * prior;
        normalize_columns(&mut posterior);
        let precision = self.precision;
        posterior.mapv_inplace(|p| round_to_precision(p, precision));

        let degenerate: Vec<usize> = posterior
            .axis_iter(Axis(1))
            .enumerate()
            .filter(|(_, col)| col.iter().any(|p| p.is_nan()))
            .map(|(j, _)| j)
            .collect();
        if degenerate.is_empty() {
            return Ok(posterior);
        }
        if !(k_llh == f64::INFINITY && k_prior == f64::INFINITY) {
            return Err(ObserverError::DegeneratePosterior {
                k_llh,
                k_prior,
                n_columns: degenerate.len(),
            });
        }

        let support: Vec<f64> = (1..=posterior.nrows()).map(|d| d as f64).collect();
        for j in degenerate {
            let mode = combined_mode(measurements[j], prior_mode, 1.0);
            let mut col = posterior.column_mut(j);
            Zip::from(&mut col).and(&point_mass(&support, mode)).for_each(|p, &q| *p = q);
        }
        Ok(posterior)
    }
}

/// Closed-form mode of the product of two von Mises densities, rounded to an
/// integer degree in `[1, 360]`.
pub fn combined_mode(u1: f64, u2: f64, k_ratio: f64) -> f64 {
    let a = deg_to_rad(u1);
    let b = deg_to_rad(u2);
    let u = a + (b - a).sin().atan2(k_ratio + (b - a).cos());
    CircularSpace::wrap(rad_to_deg(u).round())
}

/// Closed-form concentration of the product of two von Mises densities.
///
/// Not used by [`BayesCombiner`]: only the doubly-infinite case is completed
/// in closed form, and it needs just [`combined_mode`]. Kept for callers
/// reasoning about the width of an analytic posterior.
pub fn combined_concentration(k1: f64, k2: f64, u1: f64, u2: f64) -> f64 {
    let c = deg_to_rad(u2 - u1).cos();
    if k1.is_infinite() || k2.is_infinite() {
        return f64::INFINITY;
    }
    (k1 * k1 + k2 * k2 + 2.0 * k1 * k2 * c).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::core::{density::von_mises, prior::LearnedPrior, prior::PriorShape};

    fn space() -> Vec<f64> {
        (1..=360).map(|d| d as f64).collect()
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Normalization and rounding of ordinary posteriors.
    // - The doubly-infinite closed-form path.
    // - Rejection of degenerate columns for any other concentration pair.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that posteriors are normalized per column and rounded to 1e-6.
    //
    // Given
    // -----
    // - k_llh = 5, prior mode 225 with k_prior = 5.
    //
    // Expect
    // ------
    // - Every column sums to 1 within 360 · 1e-6.
    // - Every cell is a multiple of 1e-6 (up to float representation).
    // - The posterior for m = 225 peaks at 225.
    fn combine_normalizes_and_rounds() {
        let s = space();
        let llh = von_mises(&s, &s, &[5.0]).unwrap();
        let prior = LearnedPrior::new(PriorShape::VonMises, 225.0, 5.0).unwrap().tiled(360);
        let bayes = BayesCombiner::new(1e-6).unwrap();

        let post = bayes.combine(&llh, &prior, 5.0, 5.0, 225.0, &s).unwrap();

        for col in post.axis_iter(Axis(1)) {
            assert!((col.sum() - 1.0).abs() < 360.0 * 1e-6);
        }
        for &p in post.iter() {
            assert!(((p * 1e6).round() - p * 1e6).abs() < 1e-6);
        }
        let col = post.column(224);
        let max = col.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(col[224], max);
    }

    #[test]
    // Purpose
    // -------
    // Ensure doubly-infinite concentrations use the closed-form point mass.
    //
    // Given
    // -----
    // - k_llh = k_prior = inf, prior mode 100.
    //
    // Expect
    // ------
    // - Column m = 100 is a point mass at 100 (no underflow there).
    // - Column m = 140 is a point mass at the circular midpoint 120.
    // - Every column sums to exactly one.
    fn combine_uses_closed_form_for_doubly_infinite_case() {
        let s = space();
        let llh = von_mises(&s, &s, &[f64::INFINITY]).unwrap();
        let prior = LearnedPrior::new(PriorShape::VonMises, 100.0, f64::INFINITY).unwrap().tiled(360);
        let bayes = BayesCombiner::new(1e-6).unwrap();

        let post = bayes.combine(&llh, &prior, f64::INFINITY, f64::INFINITY, 100.0, &s).unwrap();

        assert_eq!(post[[99, 99]], 1.0);
        assert_eq!(post[[119, 139]], 1.0);
        for col in post.axis_iter(Axis(1)) {
            assert_eq!(col.sum(), 1.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure underflowed columns with finite concentrations are rejected.
    //
    // Given
    // -----
    // - k_llh = inf and a prior with k_prior = 1e6 centred at 100, so most
    //   measurement columns multiply a point mass by an underflowed prior.
    //
    // Expect
    // ------
    // - `DegeneratePosterior` carrying both concentrations.
    fn combine_rejects_other_degenerate_pairs() {
        let s = space();
        let llh = von_mises(&s, &s, &[f64::INFINITY]).unwrap();
        let prior = LearnedPrior::new(PriorShape::VonMises, 100.0, 1e6).unwrap().tiled(360);
        let bayes = BayesCombiner::new(1e-6).unwrap();

        let err = bayes.combine(&llh, &prior, f64::INFINITY, 1e6, 100.0, &s).unwrap_err();

        match err {
            ObserverError::DegeneratePosterior { k_llh, k_prior, n_columns } => {
                assert!(k_llh.is_infinite());
                assert_eq!(k_prior, 1e6);
                assert!(n_columns > 0);
            }
            other => panic!("expected DegeneratePosterior, got {other:?}"),
        }
    }

    #[test]
    fn closed_form_helpers_handle_symmetric_and_infinite_cases() {
        assert_eq!(combined_mode(140.0, 100.0, 1.0), 120.0);
        assert_eq!(combined_mode(350.0, 10.0, 1.0), 360.0);
        assert!(combined_concentration(f64::INFINITY, 2.0, 0.0, 0.0).is_infinite());
        assert!((combined_concentration(3.0, 4.0, 0.0, 90.0) - 5.0).abs() < 1e-12);
    }
}
