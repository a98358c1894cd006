//! loglik_optimizer::builders — simplex solver construction helpers.
//!
//! Purpose
//! -------
//! Build a configured [`SimplexSearch`] from a starting point and
//! [`MLEOptions`], so higher-level code can request a solver without
//! touching the vertex layout or Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Construct the initial simplex around `θ₀`: vertex 0 is `θ₀`; vertex
//!   `i + 1` scales coordinate `i` by `1 + nonzero_delta`, or sets it to
//!   `zero_delta` when it is exactly zero.
//! - Wire `tol_f`, `tol_x` and `max_fun_evals` from [`MLEOptions`] into the
//!   solver. The iteration cap is left to the runner, which sets
//!   `max_iters` on the Argmin state.
//!
//! Invariants & assumptions
//! ------------------------
//! - `θ₀` is non-empty and finite (checked by [`validate_theta0`]).
//! - Deltas were validated when the options were built.
//!
//! Testing notes
//! -------------
//! - Unit tests check the vertex layout, including zero coordinates, and
//!   the rejection of invalid starting points.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        simplex::SimplexSearch,
        traits::{MLEOptions, SimplexOptions},
        types::Theta,
        validation::validate_theta0,
    },
};

/// Initial `n + 1` vertices around `theta0`.
///
/// # Errors
/// - [`OptError::InvalidThetaInput`](crate::optimization::errors::OptError::InvalidThetaInput)
///   if `theta0` is empty or non-finite.
pub fn build_initial_simplex(theta0: &Theta, simplex: &SimplexOptions) -> OptResult<Vec<Theta>> {
    validate_theta0(theta0)?;
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut v = theta0.clone();
        v[i] = if v[i] != 0.0 { (1.0 + simplex.nonzero_delta) * v[i] } else { simplex.zero_delta };
        vertices.push(v);
    }
    Ok(vertices)
}

/// build_simplex_solver — construct a [`SimplexSearch`] for `theta0`.
///
/// # Errors
/// - Propagates [`build_initial_simplex`] errors.
pub fn build_simplex_solver(theta0: &Theta, opts: &MLEOptions) -> OptResult<SimplexSearch> {
    let vertices = build_initial_simplex(theta0, &opts.simplex)?;
    SimplexSearch::new(vertices, opts.tols.tol_f, opts.tols.tol_x, opts.tols.max_fun_evals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify the initial simplex layout, including zero coordinates.
    //
    // Given
    // -----
    // - θ₀ = (2, 0, −4) with default deltas.
    //
    // Expect
    // ------
    // - Four vertices: θ₀, (2.1, 0, −4), (2, 0.00025, −4), (2, 0, −4.2).
    fn initial_simplex_perturbs_one_coordinate_per_vertex() {
        let theta0 = array![2.0, 0.0, -4.0];

        let v = build_initial_simplex(&theta0, &SimplexOptions::default()).unwrap();

        assert_eq!(v.len(), 4);
        assert_eq!(v[0], theta0);
        assert!((v[1][0] - 2.1).abs() < 1e-12);
        assert_eq!(v[2], array![2.0, 0.00025, -4.0]);
        assert!((v[3][2] + 4.2).abs() < 1e-12);
        assert_eq!(v[3][0], 2.0);
    }

    #[test]
    fn solver_builder_rejects_non_finite_start() {
        let err = build_simplex_solver(&array![f64::NAN], &MLEOptions::default()).unwrap_err();

        assert!(matches!(err, OptError::InvalidThetaInput { index: 0, .. }));
    }
}
